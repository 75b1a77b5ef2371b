//! Database layer - connection pool and repositories
//!
//! The schema lives in the managed Supabase project; this crate only reads
//! and writes rows.
//!
//! - Connection pool with explicit limits, shared through `AppState`
//! - Membership checks are a single EXISTS query
//! - Multi-row inserts run in one transaction

pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
