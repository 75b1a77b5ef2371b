//! Crop endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use farmctl_core::Crop;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::{CropPatch, CropRepo, NewCrop};
use crate::http::access::{crop_for_user, farm_for_user};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidJson};
use crate::http::server::AppState;
use crate::models::{non_negative, EntityName, ValidationError};

/// Status given to crops created without one
const DEFAULT_STATUS: &str = "planned";

/// Create crop request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCropRequest {
    pub name: String,
    pub crop_type: String,
    pub variety: Option<String>,
    pub area: Option<f64>,
    pub status: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub expected_yield: Option<f64>,
}

/// Update crop request
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCropRequest {
    pub name: Option<String>,
    pub crop_type: Option<String>,
    pub variety: Option<String>,
    pub area: Option<f64>,
    pub status: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub expected_yield: Option<f64>,
    pub actual_yield: Option<f64>,
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(value.to_string())
    }
}

/// GET /api/farms/{farm_id}/crops
async fn list_crops(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(farm_id): Path<Uuid>,
) -> Result<Json<Vec<Crop>>, ApiError> {
    farm_for_user(&state.pool, farm_id, &user).await?;
    let crops = CropRepo::new(&state.pool).list_for_farm(farm_id).await?;
    Ok(Json(crops))
}

/// POST /api/farms/{farm_id}/crops
async fn create_crop(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(farm_id): Path<Uuid>,
    ValidJson(req): ValidJson<CreateCropRequest>,
) -> Result<(StatusCode, Json<Crop>), ApiError> {
    let input = NewCrop {
        farm_id,
        name: EntityName::new("name", &req.name)?,
        crop_type: required("cropType", &req.crop_type)?,
        variety: req.variety,
        area: non_negative("area", req.area)?,
        status: match req.status.as_deref() {
            Some(s) => required("status", s)?,
            None => DEFAULT_STATUS.to_string(),
        },
        planting_date: req.planting_date,
        expected_harvest_date: req.expected_harvest_date,
        expected_yield: non_negative("expectedYield", req.expected_yield)?,
    };

    farm_for_user(&state.pool, farm_id, &user).await?;
    let crop = CropRepo::new(&state.pool).create(input).await?;
    tracing::info!(crop_id = %crop.id, %farm_id, "Created crop");

    Ok((StatusCode::CREATED, Json(crop)))
}

/// GET /api/crops/{id}
async fn get_crop(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Crop>, ApiError> {
    Ok(Json(crop_for_user(&state.pool, id, &user).await?))
}

/// PUT /api/crops/{id}
async fn update_crop(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateCropRequest>,
) -> Result<Json<Crop>, ApiError> {
    let patch = CropPatch {
        name: EntityName::optional("name", req.name.as_deref())?,
        crop_type: req
            .crop_type
            .as_deref()
            .map(|t| required("cropType", t))
            .transpose()?,
        variety: req.variety,
        area: non_negative("area", req.area)?,
        status: req
            .status
            .as_deref()
            .map(|s| required("status", s))
            .transpose()?,
        planting_date: req.planting_date,
        expected_harvest_date: req.expected_harvest_date,
        expected_yield: non_negative("expectedYield", req.expected_yield)?,
        actual_yield: non_negative("actualYield", req.actual_yield)?,
    };

    crop_for_user(&state.pool, id, &user).await?;
    let crop = CropRepo::new(&state.pool).update(id, patch).await?;
    Ok(Json(crop))
}

/// DELETE /api/crops/{id}
async fn delete_crop(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    crop_for_user(&state.pool, id, &user).await?;
    CropRepo::new(&state.pool).delete(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// Crop routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/farms/{farm_id}/crops",
            get(list_crops).post(create_crop),
        )
        .route(
            "/api/crops/{id}",
            get(get_crop).put(update_crop).delete(delete_crop),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims() {
        assert_eq!(required("cropType", "  maize ").unwrap(), "maize");
        assert_eq!(
            required("cropType", " "),
            Err(ValidationError::Empty { field: "cropType" })
        );
    }
}
