//! Row models for the managed farm database
//!
//! These mirror the tables the server reads and writes:
//! - farms: owned by an organization (the tenant boundary)
//! - crops / livestock: belong to a farm
//! - growth_stages / growth_records: crop lifecycle checkpoints
//! - insights: generated advisories attached to a farm
//!
//! With the `sqlx` feature each row derives `FromRow`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A farm, the unit every other record hangs off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Farm {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    /// Total land area in hectares
    pub total_area: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A planted (or planned) crop on a farm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Crop {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub crop_type: String,
    pub variety: Option<String>,
    /// Planted area in hectares
    pub area: Option<f64>,
    /// planned, planted, growing, harvested, failed
    pub status: String,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub expected_yield: Option<f64>,
    pub actual_yield: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group of animals of one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Livestock {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    /// Head count in the group
    pub count: i32,
    /// healthy, sick, injured, under_treatment, quarantined
    pub health_status: String,
    /// Average weight in kilograms
    pub average_weight: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named phase in a crop's lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct GrowthStage {
    pub id: Uuid,
    pub crop_id: Uuid,
    pub name: String,
    pub stage_order: i32,
    pub description: Option<String>,
    pub expected_duration_days: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A dated observation of a crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct GrowthRecord {
    pub id: Uuid,
    pub crop_id: Uuid,
    pub stage_id: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
    pub height_cm: Option<f64>,
    pub health_status: Option<String>,
    pub notes: Option<String>,
    pub image_urls: Vec<String>,
    pub metadata: serde_json::Value,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored insight row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Insight {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub organization_id: Uuid,
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub recommended_actions: Vec<String>,
    pub confidence: f64,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
