//! API request and response types

use crate::health_metrics::{ActivityLevel, JobActivity, SportIntensity};
use crate::models::UpsertOutcome;
use crate::plan::{Plan, ProjectionInput, ProjectionOutcome};
use crate::profile::Profile;
use crate::trend::{Indicators, TrackedPoint};
use crate::validation::{validate_projection_input, FieldViolation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Plan computed for a profile, with the profile echoed back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub profile: Profile,
    pub plan: Plan,
}

/// Stored profile of the caller's partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    pub profile: Profile,
}

/// Record a daily weight; date defaults to today
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogWeightRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogWeightResponse {
    pub date: NaiveDate,
    pub weight_kg: f64,
    #[serde(flatten)]
    pub outcome: UpsertOutcome,
}

/// Actual-vs-projected view of a partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingResponse {
    pub measurements: Vec<TrackedPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<Indicators>,
    /// Absent when no plan was supplied and no profile could be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionOutcome>,
}

/// Query of the tracking view: an optional plan to draw instead of the
/// stored profile's. Either all three values are given or none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingQuery {
    pub start_weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    pub real_deficit: Option<f64>,
}

impl TrackingQuery {
    pub fn projection_input(&self) -> Result<Option<ProjectionInput>, FieldViolation> {
        let input = match (self.start_weight_kg, self.target_weight_kg, self.real_deficit) {
            (None, None, None) => return Ok(None),
            (Some(start_weight_kg), Some(target_weight_kg), Some(real_deficit)) => {
                ProjectionInput {
                    start_weight_kg,
                    target_weight_kg,
                    real_deficit,
                }
            }
            _ => {
                return Err(FieldViolation {
                    field: "projection",
                    message: "start_weight_kg, target_weight_kg and real_deficit go together"
                        .to_string(),
                })
            }
        };
        validate_projection_input(&input)?;
        Ok(Some(input))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    LastMeasurement,
    Profile,
}

/// Pre-filled value for the next daily entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedWeightResponse {
    pub weight_kg: f64,
    pub source: SuggestionSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub removed: usize,
}

/// One selectable value of an activity table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityOption {
    pub key: String,
    pub value: f64,
    pub description: String,
}

/// Activity tables with their descriptions, for building selection lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityOptionsResponse {
    pub activity_levels: Vec<ActivityOption>,
    pub job_activities: Vec<ActivityOption>,
    pub sport_intensities: Vec<ActivityOption>,
}

impl ActivityOptionsResponse {
    pub fn build() -> Self {
        Self {
            activity_levels: ActivityLevel::ALL
                .iter()
                .map(|l| ActivityOption {
                    key: l.to_string(),
                    value: l.multiplier(),
                    description: l.description().to_string(),
                })
                .collect(),
            job_activities: JobActivity::ALL
                .iter()
                .map(|j| ActivityOption {
                    key: j.to_string(),
                    value: j.base_factor(),
                    description: j.description().to_string(),
                })
                .collect(),
            sport_intensities: SportIntensity::ALL
                .iter()
                .map(|s| ActivityOption {
                    key: s.to_string(),
                    value: s.coefficient(),
                    description: s.description().to_string(),
                })
                .collect(),
        }
    }
}
