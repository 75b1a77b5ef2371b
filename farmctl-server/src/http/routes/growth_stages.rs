//! Growth stage endpoints
//!
//! Same addressing and check order as growth records.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use farmctl_core::GrowthStage;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::{GrowthStagePatch, GrowthStageRepo, NewGrowthStage};
use crate::http::access::crop_for_user;
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidJson};
use crate::http::server::AppState;
use crate::models::{non_negative_count, parse_id, EntityName, ValidationError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageQuery {
    pub id: Option<String>,
    pub crop_id: Option<String>,
}

impl StageQuery {
    fn require_id(&self) -> Result<Uuid, ValidationError> {
        match self.id.as_deref() {
            Some(raw) => parse_id("id", raw),
            None => Err(ValidationError::Missing { field: "id" }),
        }
    }
}

/// Create stage request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStageRequest {
    pub crop_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub stage_order: i32,
    pub description: Option<String>,
    pub expected_duration_days: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Update stage request
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStageRequest {
    pub name: Option<String>,
    pub stage_order: Option<i32>,
    pub description: Option<String>,
    pub expected_duration_days: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

fn check_window(
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (started_at, completed_at) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::InvalidFormat {
            field: "completedAt",
            reason: "must not be before startedAt",
        }),
        _ => Ok(()),
    }
}

/// Window check for a partial update: omitted bounds keep their stored value.
fn check_updated_window(
    req: &UpdateStageRequest,
    stored: &GrowthStage,
) -> Result<(), ValidationError> {
    check_window(
        req.started_at.or(stored.started_at),
        req.completed_at.or(stored.completed_at),
    )
}

/// GET /api/growth/stages?id= | ?cropId=
async fn get_stages(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<StageQuery>,
) -> Result<Response, ApiError> {
    let repo = GrowthStageRepo::new(&state.pool);

    if let Some(raw) = query.id.as_deref() {
        let id = parse_id("id", raw)?;
        let stage = repo.get(id).await?;
        crop_for_user(&state.pool, stage.crop_id, &user).await?;
        return Ok(Json(stage).into_response());
    }

    if let Some(raw) = query.crop_id.as_deref() {
        let crop_id = parse_id("cropId", raw)?;
        crop_for_user(&state.pool, crop_id, &user).await?;
        let stages = repo.list_for_crop(crop_id).await?;
        return Ok(Json(stages).into_response());
    }

    Err(ValidationError::Missing {
        field: "cropId or id",
    }
    .into())
}

/// POST /api/growth/stages
async fn create_stage(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateStageRequest>,
) -> Result<(StatusCode, Json<GrowthStage>), ApiError> {
    check_window(req.started_at, req.completed_at)?;
    let input = NewGrowthStage {
        crop_id: req.crop_id,
        name: EntityName::new("name", &req.name)?,
        stage_order: non_negative_count("stageOrder", Some(req.stage_order))?.unwrap_or(0),
        description: req.description,
        expected_duration_days: non_negative_count(
            "expectedDurationDays",
            req.expected_duration_days,
        )?,
        started_at: req.started_at,
        completed_at: req.completed_at,
    };

    crop_for_user(&state.pool, input.crop_id, &user).await?;
    let stage = GrowthStageRepo::new(&state.pool).create(input).await?;
    tracing::info!(stage_id = %stage.id, crop_id = %stage.crop_id, "Created growth stage");

    Ok((StatusCode::CREATED, Json(stage)))
}

/// PUT /api/growth/stages?id=
async fn update_stage(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<StageQuery>,
    ValidJson(req): ValidJson<UpdateStageRequest>,
) -> Result<Json<GrowthStage>, ApiError> {
    let id = query.require_id()?;
    check_window(req.started_at, req.completed_at)?;
    let patch = GrowthStagePatch {
        name: EntityName::optional("name", req.name.as_deref())?,
        stage_order: non_negative_count("stageOrder", req.stage_order)?,
        description: req.description.clone(),
        expected_duration_days: non_negative_count(
            "expectedDurationDays",
            req.expected_duration_days,
        )?,
        started_at: req.started_at,
        completed_at: req.completed_at,
    };

    let repo = GrowthStageRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    crop_for_user(&state.pool, existing.crop_id, &user).await?;
    check_updated_window(&req, &existing)?;

    let stage = repo.update(id, patch).await?;
    Ok(Json(stage))
}

/// DELETE /api/growth/stages?id=
async fn delete_stage(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<StageQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = query.require_id()?;

    let repo = GrowthStageRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    crop_for_user(&state.pool, existing.crop_id, &user).await?;

    repo.delete(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// Growth stage routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/growth/stages",
        get(get_stages)
            .post(create_stage)
            .put(update_stage)
            .delete(delete_stage),
    )
}
