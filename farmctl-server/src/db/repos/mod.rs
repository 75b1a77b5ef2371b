//! Repository implementations for database access
//!
//! Each repository borrows the pool for the length of a request and maps
//! missing rows to `DbError::NotFound`.

pub mod crops;
pub mod farms;
pub mod growth_records;
pub mod growth_stages;
pub mod insights;
pub mod livestock;
pub mod members;

pub use crops::{CropPatch, CropRepo, NewCrop};
pub use farms::{FarmPatch, FarmRepo, NewFarm};
pub use growth_records::{GrowthRecordPatch, GrowthRecordRepo, NewGrowthRecord};
pub use growth_stages::{GrowthStagePatch, GrowthStageRepo, NewGrowthStage};
pub use insights::InsightRepo;
pub use livestock::{LivestockPatch, LivestockRepo, NewLivestock};
pub use members::MemberRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}
