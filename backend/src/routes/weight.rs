//! Weight tracking API routes

use crate::error::ApiError;
use crate::identity::UserIdentity;
use crate::services::WeightService;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    routing::get,
    Json, Router,
};
use weight_plan_shared::types::{
    LogWeightRequest, LogWeightResponse, ResetResponse, SuggestedWeightResponse, TrackingQuery,
    TrackingResponse,
};

/// Create weight routes
pub fn weight_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(get_tracking).post(log_weight).delete(reset_weights),
        )
        .route("/export", get(export_csv))
        .route("/suggested", get(suggested_weight))
}

/// POST /api/v1/weight - Record a daily weight (upsert by date)
async fn log_weight(
    State(state): State<AppState>,
    user: UserIdentity,
    Json(req): Json<LogWeightRequest>,
) -> Result<Json<LogWeightResponse>, ApiError> {
    Ok(Json(WeightService::log_weight(&state, &user, req).await?))
}

/// GET /api/v1/weight - History with trend, week axis, indicators and
/// projection. `?start_weight_kg=..&target_weight_kg=..&real_deficit=..`
/// draws that plan instead of the stored profile's.
async fn get_tracking(
    State(state): State<AppState>,
    user: UserIdentity,
    Query(query): Query<TrackingQuery>,
) -> Result<Json<TrackingResponse>, ApiError> {
    let plan = query.projection_input()?;
    Ok(Json(WeightService::tracking(&state, &user, plan).await?))
}

/// DELETE /api/v1/weight - Remove every measurement of the partition
async fn reset_weights(
    State(state): State<AppState>,
    user: UserIdentity,
) -> Result<Json<ResetResponse>, ApiError> {
    let removed = WeightService::reset(&state, &user).await?;
    Ok(Json(ResetResponse { removed }))
}

/// GET /api/v1/weight/export - History as `date,weight` CSV
async fn export_csv(
    State(state): State<AppState>,
    user: UserIdentity,
) -> Result<(HeaderMap, String), ApiError> {
    let csv = WeightService::export_csv(&state, &user).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"weight_history.csv\""),
    );

    Ok((headers, csv))
}

/// GET /api/v1/weight/suggested - Default weight for the next entry
async fn suggested_weight(
    State(state): State<AppState>,
    user: UserIdentity,
) -> Result<Json<SuggestedWeightResponse>, ApiError> {
    Ok(Json(WeightService::suggested_weight(&state, &user).await?))
}
