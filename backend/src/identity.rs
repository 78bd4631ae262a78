//! Caller identity extraction
//!
//! The optional `X-User-Id` header selects the storage partition. Without
//! it the request works on the single-user partition.

use crate::error::ApiError;
use axum::http::request::Parts;
use weight_plan_shared::Identity;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Partition selected by the request; `None` is the single-user partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity(pub Option<Identity>);

impl UserIdentity {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }

    /// Partition key used for locks and cache entries
    pub fn key(&self) -> String {
        self.0
            .as_ref()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(UserIdentity(None));
        };

        let raw = raw
            .to_str()
            .map_err(|_| ApiError::BadRequest("User identity must be visible ASCII".to_string()))?;

        let identity = Identity::new(raw).map_err(|e| ApiError::InvalidField {
            field: "identity".to_string(),
            message: e.to_string(),
        })?;
        Ok(UserIdentity(Some(identity)))
    }
}
