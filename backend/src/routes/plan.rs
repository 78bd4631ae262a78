//! Plan API routes

use crate::error::ApiError;
use crate::identity::UserIdentity;
use crate::services::PlanService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use weight_plan_shared::types::{ActivityOptionsResponse, PlanResponse};
use weight_plan_shared::Profile;

/// Create plan routes
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_stored_plan).post(compute_plan))
        .route("/options", get(activity_options))
}

/// POST /api/v1/plan - Compute a plan for the submitted profile
async fn compute_plan(Json(profile): Json<Profile>) -> Result<Json<PlanResponse>, ApiError> {
    Ok(Json(PlanService::compute(profile)?))
}

/// GET /api/v1/plan - Plan for the caller's stored profile
async fn get_stored_plan(
    State(state): State<AppState>,
    user: UserIdentity,
) -> Result<Json<PlanResponse>, ApiError> {
    Ok(Json(PlanService::for_stored_profile(&state, &user).await?))
}

/// GET /api/v1/plan/options - Activity tables with descriptions
async fn activity_options() -> Json<ActivityOptionsResponse> {
    Json(ActivityOptionsResponse::build())
}
