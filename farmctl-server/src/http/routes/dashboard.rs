//! Dashboard endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use farmctl_core::{build_dashboard, FarmDashboard};
use uuid::Uuid;

use crate::db::{CropRepo, InsightRepo, LivestockRepo};
use crate::http::access::farm_for_user;
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::http::server::AppState;

/// GET /api/farms/{farm_id}/dashboard
async fn farm_dashboard(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(farm_id): Path<Uuid>,
) -> Result<Json<FarmDashboard>, ApiError> {
    let farm = farm_for_user(&state.pool, farm_id, &user).await?;

    let crops = CropRepo::new(&state.pool);
    let livestock = LivestockRepo::new(&state.pool);
    let insights = InsightRepo::new(&state.pool);
    let (crops, livestock, insights) = tokio::try_join!(
        crops.list_for_farm(farm_id),
        livestock.list_for_farm(farm_id),
        insights.list_for_farm(farm_id),
    )?;

    Ok(Json(build_dashboard(&farm, &crops, &livestock, &insights)))
}

/// Dashboard routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/farms/{farm_id}/dashboard", get(farm_dashboard))
}
