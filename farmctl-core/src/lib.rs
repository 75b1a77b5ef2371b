pub mod dashboard;
pub mod error;
pub mod insight;
pub mod models;
pub mod prompt;

pub use dashboard::{
    build_dashboard, crop_distribution, crop_status_breakdown, harvest_timeline,
    livestock_health, ratio, severity_counts, CategoryBucket, FarmDashboard, HealthBucket,
    SeverityCounts, TimelinePoint,
};
pub use error::{CoreError, Result};
pub use insight::{
    extract_candidates, normalize_insight, InsightContext, NewInsight, Severity,
    DEFAULT_CONFIDENCE, DEFAULT_TITLE, INSIGHT_TYPE,
};
pub use models::{Crop, Farm, GrowthRecord, GrowthStage, Insight, Livestock};
pub use prompt::{build_farm_prompt, build_livestock_prompt, FarmSnapshot, Prompt};
