//! Profile service - stored profile read and save

use crate::error::ApiError;
use crate::identity::UserIdentity;
use crate::state::AppState;
use tracing::{debug, info};
use weight_plan_shared::validation::validate_profile;
use weight_plan_shared::{Profile, ProfileFields};

/// Profile service for profile operations
pub struct ProfileService;

impl ProfileService {
    /// Stored fields of a partition, served from cache when fresh
    pub async fn stored_fields(
        state: &AppState,
        user: &UserIdentity,
    ) -> Result<ProfileFields, ApiError> {
        let key = user.key();
        if let Some(fields) = state.profiles.get(&key).await {
            debug!(partition = %key, "Profile cache hit");
            return Ok(fields);
        }

        // Filled under the partition lock so a save cannot be overtaken
        let _guard = state.locks.acquire(&key).await;
        if let Some(fields) = state.profiles.get(&key).await {
            return Ok(fields);
        }
        let fields = state.store().get_fields(user.identity()).await?;
        state.profiles.insert(key, fields.clone()).await;
        Ok(fields)
    }

    /// Typed profile with defaults filled for every absent field
    pub async fn get_profile(state: &AppState, user: &UserIdentity) -> Result<Profile, ApiError> {
        let fields = Self::stored_fields(state, user).await?;
        Ok(Profile::from_fields(&fields)?)
    }

    /// Validate and persist a profile, field by field
    pub async fn save_profile(
        state: &AppState,
        user: &UserIdentity,
        profile: Profile,
    ) -> Result<Profile, ApiError> {
        validate_profile(&profile)?;

        let key = user.key();
        let _guard = state.locks.acquire(&key).await;
        state
            .store()
            .save_fields(user.identity(), &profile.to_fields())
            .await?;
        state.profiles.invalidate(&key).await;

        info!(partition = %key, "Profile saved");
        Ok(profile)
    }
}
