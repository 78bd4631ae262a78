//! Profile API routes

use crate::error::ApiError;
use crate::identity::UserIdentity;
use crate::services::ProfileService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use weight_plan_shared::types::ProfileResponse;
use weight_plan_shared::Profile;

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

/// GET /api/v1/profile - Stored profile, defaults filled
async fn get_profile(
    State(state): State<AppState>,
    user: UserIdentity,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = ProfileService::get_profile(&state, &user).await?;
    Ok(Json(ProfileResponse {
        identity: user.identity().map(|id| id.to_string()),
        profile,
    }))
}

/// PUT /api/v1/profile - Validate and save the profile fields
async fn update_profile(
    State(state): State<AppState>,
    user: UserIdentity,
    Json(profile): Json<Profile>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = ProfileService::save_profile(&state, &user, profile).await?;
    Ok(Json(ProfileResponse {
        identity: user.identity().map(|id| id.to_string()),
        profile,
    }))
}
