//! Farm endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use farmctl_core::Farm;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::{FarmPatch, FarmRepo, NewFarm};
use crate::http::access::{farm_for_user, require_member};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidJson};
use crate::http::server::AppState;
use crate::models::{non_negative, EntityName};

/// Create farm request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFarmRequest {
    pub organization_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub total_area: Option<f64>,
    pub description: Option<String>,
}

/// Update farm request; absent fields are left unchanged
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFarmRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub total_area: Option<f64>,
    pub description: Option<String>,
}

/// GET /api/farms - farms of every organization the caller belongs to
async fn list_farms(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Farm>>, ApiError> {
    let farms = FarmRepo::new(&state.pool).list_for_user(user.id).await?;
    Ok(Json(farms))
}

/// POST /api/farms
async fn create_farm(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateFarmRequest>,
) -> Result<(StatusCode, Json<Farm>), ApiError> {
    let input = NewFarm {
        organization_id: req.organization_id,
        name: EntityName::new("name", &req.name)?,
        location: req.location,
        total_area: non_negative("totalArea", req.total_area)?,
        description: req.description,
    };

    require_member(&state.pool, input.organization_id, &user).await?;
    let farm = FarmRepo::new(&state.pool).create(input).await?;
    tracing::info!(farm_id = %farm.id, "Created farm");

    Ok((StatusCode::CREATED, Json(farm)))
}

/// GET /api/farms/{id}
async fn get_farm(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Farm>, ApiError> {
    Ok(Json(farm_for_user(&state.pool, id, &user).await?))
}

/// PUT /api/farms/{id}
async fn update_farm(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateFarmRequest>,
) -> Result<Json<Farm>, ApiError> {
    let patch = FarmPatch {
        name: EntityName::optional("name", req.name.as_deref())?,
        location: req.location,
        total_area: non_negative("totalArea", req.total_area)?,
        description: req.description,
    };

    farm_for_user(&state.pool, id, &user).await?;
    let farm = FarmRepo::new(&state.pool).update(id, patch).await?;
    Ok(Json(farm))
}

/// DELETE /api/farms/{id}
async fn delete_farm(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    farm_for_user(&state.pool, id, &user).await?;
    FarmRepo::new(&state.pool).delete(id).await?;
    tracing::info!(farm_id = %id, "Deleted farm");
    Ok(Json(json!({ "deleted": true })))
}

/// Farm routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/farms", get(list_farms).post(create_farm))
        .route(
            "/api/farms/{id}",
            get(get_farm).put(update_farm).delete(delete_farm),
        )
}
