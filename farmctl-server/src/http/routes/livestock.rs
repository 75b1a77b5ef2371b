//! Livestock endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use farmctl_core::Livestock;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::clients::AuthUser;
use crate::db::{LivestockPatch, LivestockRepo, NewLivestock};
use crate::http::access::farm_for_user;
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidJson};
use crate::http::server::AppState;
use crate::models::{non_negative, non_negative_count, EntityName, ValidationError};

const DEFAULT_HEALTH: &str = "healthy";

/// Create livestock request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLivestockRequest {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub count: Option<i32>,
    pub health_status: Option<String>,
    pub average_weight: Option<f64>,
    pub notes: Option<String>,
}

/// Update livestock request
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLivestockRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub count: Option<i32>,
    pub health_status: Option<String>,
    pub average_weight: Option<f64>,
    pub notes: Option<String>,
}

fn species(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Empty { field: "species" })
    } else {
        Ok(value.to_string())
    }
}

/// Load a livestock group and check access through its farm.
async fn livestock_for_user(
    state: &AppState,
    id: Uuid,
    user: &AuthUser,
) -> Result<Livestock, ApiError> {
    let livestock = LivestockRepo::new(&state.pool).get(id).await?;
    farm_for_user(&state.pool, livestock.farm_id, user).await?;
    Ok(livestock)
}

/// GET /api/farms/{farm_id}/livestock
async fn list_livestock(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(farm_id): Path<Uuid>,
) -> Result<Json<Vec<Livestock>>, ApiError> {
    farm_for_user(&state.pool, farm_id, &user).await?;
    let livestock = LivestockRepo::new(&state.pool).list_for_farm(farm_id).await?;
    Ok(Json(livestock))
}

/// POST /api/farms/{farm_id}/livestock
async fn create_livestock(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(farm_id): Path<Uuid>,
    ValidJson(req): ValidJson<CreateLivestockRequest>,
) -> Result<(StatusCode, Json<Livestock>), ApiError> {
    let input = NewLivestock {
        farm_id,
        name: EntityName::new("name", &req.name)?,
        species: species(&req.species)?,
        breed: req.breed,
        count: non_negative_count("count", req.count)?.unwrap_or(0),
        health_status: req
            .health_status
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HEALTH.to_string()),
        average_weight: non_negative("averageWeight", req.average_weight)?,
        notes: req.notes,
    };

    farm_for_user(&state.pool, farm_id, &user).await?;
    let livestock = LivestockRepo::new(&state.pool).create(input).await?;
    tracing::info!(livestock_id = %livestock.id, %farm_id, "Created livestock group");

    Ok((StatusCode::CREATED, Json(livestock)))
}

/// GET /api/livestock/{id}
async fn get_livestock(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Livestock>, ApiError> {
    Ok(Json(livestock_for_user(&state, id, &user).await?))
}

/// PUT /api/livestock/{id}
async fn update_livestock(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateLivestockRequest>,
) -> Result<Json<Livestock>, ApiError> {
    let patch = LivestockPatch {
        name: EntityName::optional("name", req.name.as_deref())?,
        species: req.species.as_deref().map(species).transpose()?,
        breed: req.breed,
        count: non_negative_count("count", req.count)?,
        health_status: req.health_status.filter(|h| !h.trim().is_empty()),
        average_weight: non_negative("averageWeight", req.average_weight)?,
        notes: req.notes,
    };

    livestock_for_user(&state, id, &user).await?;
    let livestock = LivestockRepo::new(&state.pool).update(id, patch).await?;
    Ok(Json(livestock))
}

/// DELETE /api/livestock/{id}
async fn delete_livestock(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    livestock_for_user(&state, id, &user).await?;
    LivestockRepo::new(&state.pool).delete(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// Livestock routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/farms/{farm_id}/livestock",
            get(list_livestock).post(create_livestock),
        )
        .route(
            "/api/livestock/{id}",
            get(get_livestock)
                .put(update_livestock)
                .delete(delete_livestock),
        )
}
