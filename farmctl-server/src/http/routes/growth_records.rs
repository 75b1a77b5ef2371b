//! Growth record endpoints
//!
//! One path, addressed by query string: `?id=` for a single record,
//! `?cropId=` for a crop's history. Checks run in a fixed order and each
//! failure stops the request before anything is written:
//! 401 (token) -> 400 (ids and body) -> 404 (row) -> 403 (membership).

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use farmctl_core::GrowthRecord;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::{GrowthRecordPatch, GrowthRecordRepo, NewGrowthRecord};
use crate::http::access::crop_for_user;
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidJson};
use crate::http::server::AppState;
use crate::models::{non_negative, parse_id, ValidationError};

/// `?id=` / `?cropId=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    pub id: Option<String>,
    pub crop_id: Option<String>,
}

impl RecordQuery {
    fn require_id(&self) -> Result<Uuid, ValidationError> {
        match self.id.as_deref() {
            Some(raw) => parse_id("id", raw),
            None => Err(ValidationError::Missing { field: "id" }),
        }
    }
}

/// Create record request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    pub crop_id: Uuid,
    pub stage_id: Option<Uuid>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub height_cm: Option<f64>,
    pub health_status: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub metadata: Option<Value>,
}

/// Update record request; the crop cannot be changed
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    pub stage_id: Option<Uuid>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub height_cm: Option<f64>,
    pub health_status: Option<String>,
    pub notes: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub metadata: Option<Value>,
}

fn metadata_object(value: Option<Value>) -> Result<Option<Value>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Object(_)) => Ok(Some(v)),
        Some(_) => Err(ValidationError::InvalidFormat {
            field: "metadata",
            reason: "must be an object",
        }),
    }
}

/// GET /api/growth/records?id= | ?cropId=
async fn get_records(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordQuery>,
) -> Result<Response, ApiError> {
    let repo = GrowthRecordRepo::new(&state.pool);

    if let Some(raw) = query.id.as_deref() {
        let id = parse_id("id", raw)?;
        let record = repo.get(id).await?;
        crop_for_user(&state.pool, record.crop_id, &user).await?;
        return Ok(Json(record).into_response());
    }

    if let Some(raw) = query.crop_id.as_deref() {
        let crop_id = parse_id("cropId", raw)?;
        crop_for_user(&state.pool, crop_id, &user).await?;
        let records = repo.list_for_crop(crop_id).await?;
        return Ok(Json(records).into_response());
    }

    Err(ValidationError::Missing {
        field: "cropId or id",
    }
    .into())
}

/// POST /api/growth/records
async fn create_record(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateRecordRequest>,
) -> Result<(StatusCode, Json<GrowthRecord>), ApiError> {
    let input = NewGrowthRecord {
        crop_id: req.crop_id,
        stage_id: req.stage_id,
        recorded_at: req.recorded_at.unwrap_or_else(Utc::now),
        height_cm: non_negative("heightCm", req.height_cm)?,
        health_status: req.health_status,
        notes: req.notes,
        image_urls: req.image_urls,
        metadata: metadata_object(req.metadata)?.unwrap_or_else(|| json!({})),
        created_by: user.id,
    };

    crop_for_user(&state.pool, input.crop_id, &user).await?;
    let record = GrowthRecordRepo::new(&state.pool).create(input).await?;
    tracing::info!(record_id = %record.id, crop_id = %record.crop_id, "Created growth record");

    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/growth/records?id=
async fn update_record(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordQuery>,
    ValidJson(req): ValidJson<UpdateRecordRequest>,
) -> Result<Json<GrowthRecord>, ApiError> {
    let id = query.require_id()?;
    let patch = GrowthRecordPatch {
        stage_id: req.stage_id,
        recorded_at: req.recorded_at,
        height_cm: non_negative("heightCm", req.height_cm)?,
        health_status: req.health_status,
        notes: req.notes,
        image_urls: req.image_urls,
        metadata: metadata_object(req.metadata)?,
    };

    let repo = GrowthRecordRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    crop_for_user(&state.pool, existing.crop_id, &user).await?;

    let record = repo.update(id, patch).await?;
    Ok(Json(record))
}

/// DELETE /api/growth/records?id=
async fn delete_record(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = query.require_id()?;

    let repo = GrowthRecordRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    crop_for_user(&state.pool, existing.crop_id, &user).await?;

    repo.delete(id).await?;
    tracing::info!(record_id = %id, "Deleted growth record");
    Ok(Json(json!({ "deleted": true })))
}

/// Growth record routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/growth/records",
        get(get_records)
            .post(create_record)
            .put(update_record)
            .delete(delete_record),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::server::tests::{body_json, test_router, GOOD_TOKEN};
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn put(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::put(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder
            .body(Body::from(json!({"notes": "tasseling"}).to_string()))
            .unwrap()
    }

    // The test pool cannot connect: a 401 here proves the handler stopped
    // before any query ran.
    #[tokio::test]
    async fn update_without_auth_is_401() {
        let uri = format!("/api/growth/records?id={}", Uuid::new_v4());
        let response = test_router().oneshot(put(&uri, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "unauthorized");
    }

    #[tokio::test]
    async fn update_with_rejected_token_is_401() {
        let uri = format!("/api/growth/records?id={}", Uuid::new_v4());
        let response = test_router()
            .oneshot(put(&uri, Some("Bearer expired")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn update_without_id_is_400() {
        let auth = format!("Bearer {}", GOOD_TOKEN);
        let response = test_router()
            .oneshot(put("/api/growth/records", Some(auth.as_str())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn listing_needs_crop_or_id() {
        let response = test_router()
            .oneshot(
                Request::get("/api/growth/records")
                    .header(header::AUTHORIZATION, format!("Bearer {}", GOOD_TOKEN))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "cropId or id is required"
        );
    }

    #[tokio::test]
    async fn malformed_crop_id_is_400() {
        let response = test_router()
            .oneshot(
                Request::get("/api/growth/records?cropId=abc")
                    .header(header::AUTHORIZATION, format!("Bearer {}", GOOD_TOKEN))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn metadata_must_be_an_object() {
        assert_eq!(metadata_object(None).unwrap(), None);
        assert!(metadata_object(Some(json!({"k": 1}))).unwrap().is_some());
        assert!(metadata_object(Some(json!([1, 2]))).is_err());
    }
}
