//! Plan service - caloric plan and projection for a profile

use crate::error::ApiError;
use crate::identity::UserIdentity;
use crate::services::ProfileService;
use crate::state::AppState;
use tracing::{debug, warn};
use weight_plan_shared::types::PlanResponse;
use weight_plan_shared::validation::validate_profile;
use weight_plan_shared::{calculate_plan, Profile};

pub struct PlanService;

impl PlanService {
    /// Compute the plan for a submitted profile
    pub fn compute(profile: Profile) -> Result<PlanResponse, ApiError> {
        validate_profile(&profile)?;
        let plan = calculate_plan(&profile);
        if let Some(warning) = &plan.activity.warning {
            warn!(activity_factor = warning.value, "{}", warning);
        }
        if let Some(projection) = plan.projection.projection() {
            debug!(
                estimated_weeks = projection.estimated_weeks,
                horizon_weeks = projection.horizon_weeks,
                "Plan computed"
            );
        }
        Ok(PlanResponse { profile, plan })
    }

    /// Compute the plan for the partition's stored profile
    pub async fn for_stored_profile(
        state: &AppState,
        user: &UserIdentity,
    ) -> Result<PlanResponse, ApiError> {
        let profile = ProfileService::get_profile(state, user).await?;
        Self::compute(profile)
    }
}
