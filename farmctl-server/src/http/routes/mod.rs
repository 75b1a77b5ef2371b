//! Route handlers organized by resource

pub mod crops;
pub mod dashboard;
pub mod farms;
pub mod growth_records;
pub mod growth_stages;
pub mod health;
pub mod insights;
pub mod livestock;
pub mod upload;
