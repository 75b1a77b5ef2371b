//! Request flows that span several repositories and clients

pub mod insights;

pub use insights::{Draft, InsightError, InsightService, InsightStore, PgInsightStore};
