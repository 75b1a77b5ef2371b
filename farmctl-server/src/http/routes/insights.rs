//! Insight endpoints: AI generation, listing and dismissal

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use farmctl_core::Insight;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::InsightRepo;
use crate::http::access::farm_for_user;
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidJson};
use crate::http::server::AppState;
use crate::services::{InsightService, PgInsightStore};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmInsightRequest {
    pub farm_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivestockInsightRequest {
    pub livestock_id: Uuid,
}

/// POST /api/ai/insights - generate and store insights for a farm
async fn generate_farm(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<FarmInsightRequest>,
) -> Result<Json<Vec<Insight>>, ApiError> {
    let store = PgInsightStore::new(state.pool.clone());
    let service = InsightService::new(&store, state.ai.as_ref());

    let insights = service.generate_farm_insights(req.farm_id, &user).await?;
    tracing::info!(farm_id = %req.farm_id, count = insights.len(), "Stored farm insights");
    Ok(Json(insights))
}

/// POST /api/ai/livestock-insights - same flow for one livestock group
async fn generate_livestock(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LivestockInsightRequest>,
) -> Result<Json<Vec<Insight>>, ApiError> {
    let store = PgInsightStore::new(state.pool.clone());
    let service = InsightService::new(&store, state.ai.as_ref());

    let insights = service
        .generate_livestock_insights(req.livestock_id, &user)
        .await?;
    tracing::info!(livestock_id = %req.livestock_id, count = insights.len(), "Stored livestock insights");
    Ok(Json(insights))
}

/// GET /api/farms/{farm_id}/insights - newest first
async fn list_insights(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(farm_id): Path<Uuid>,
) -> Result<Json<Vec<Insight>>, ApiError> {
    farm_for_user(&state.pool, farm_id, &user).await?;
    let insights = InsightRepo::new(&state.pool).list_for_farm(farm_id).await?;
    Ok(Json(insights))
}

/// DELETE /api/insights/{id} - dismiss one insight
async fn dismiss_insight(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let repo = InsightRepo::new(&state.pool);
    let insight = repo.get(id).await?;
    farm_for_user(&state.pool, insight.farm_id, &user).await?;
    repo.delete(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// Insight routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ai/insights", post(generate_farm))
        .route("/api/ai/livestock-insights", post(generate_livestock))
        .route("/api/farms/{farm_id}/insights", get(list_insights))
        .route("/api/insights/{id}", delete(dismiss_insight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::server::tests::{test_router, GOOD_TOKEN};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn generation_requires_auth() {
        let body = json!({ "farmId": Uuid::new_v4() });
        let response = test_router()
            .oneshot(
                Request::post("/api/ai/insights")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn generation_rejects_malformed_farm_id() {
        let body = json!({ "farmId": "not-a-uuid" });
        let response = test_router()
            .oneshot(
                Request::post("/api/ai/insights")
                    .header(header::AUTHORIZATION, format!("Bearer {}", GOOD_TOKEN))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
