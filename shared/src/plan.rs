//! Plan calculator
//!
//! Turns a [`Profile`] into a caloric budget and a weekly weight projection.
//! The projection inputs are exposed as an explicit [`ProjectionInput`] so
//! the tracking view can be handed the same trajectory without sharing state.

use crate::health_metrics::{
    calculate_activity_factor, calculate_bmr_mifflin, calculate_calorie_target, calculate_tdee,
    protein_target_g, resolve_deficit, ActivityFactor, CalorieTarget,
};
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy content of 1 kg of adipose tissue (kcal)
pub const KCAL_PER_KG_FAT: f64 = 7700.0;
/// Weeks shown past the estimated finish
pub const HORIZON_MARGIN_WEEKS: i64 = 2;
pub const MIN_HORIZON_WEEKS: i64 = 4;
pub const MAX_HORIZON_WEEKS: i64 = 104;

/// The three numbers a projection is derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub start_weight_kg: f64,
    pub target_weight_kg: f64,
    pub real_deficit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub week: u32,
    pub weight_kg: f64,
}

/// Weekly weight trajectory, floored at the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub weekly_loss_kg: f64,
    pub estimated_weeks: f64,
    pub horizon_weeks: u32,
    pub points: Vec<ProjectionPoint>,
}

/// Why no projection could be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Target weight is not below the current weight
    NoLossNeeded,
    /// The calorie floor leaves no effective deficit
    NoDeficit,
}

impl UnavailableReason {
    pub fn message(&self) -> &'static str {
        match self {
            UnavailableReason::NoLossNeeded => {
                "Set a target weight below the current weight to see the projection."
            }
            UnavailableReason::NoDeficit => {
                "No effective deficit: increase the deficit or lower the calorie target."
            }
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectionOutcome {
    Available(Projection),
    Unavailable { reason: UnavailableReason },
}

impl ProjectionOutcome {
    pub fn projection(&self) -> Option<&Projection> {
        match self {
            ProjectionOutcome::Available(p) => Some(p),
            ProjectionOutcome::Unavailable { .. } => None,
        }
    }
}

/// Weight lost per week for a daily deficit
pub fn weekly_loss_kg(real_deficit: f64) -> f64 {
    real_deficit * 7.0 / KCAL_PER_KG_FAT
}

/// Number of weeks to draw: the rounded estimate plus a margin, kept in
/// `[MIN_HORIZON_WEEKS, MAX_HORIZON_WEEKS]`.
pub fn projection_horizon_weeks(estimated_weeks: f64) -> u32 {
    let rounded = if estimated_weeks.is_finite() {
        estimated_weeks.round() as i64
    } else {
        MAX_HORIZON_WEEKS
    };
    rounded
        .saturating_add(HORIZON_MARGIN_WEEKS)
        .clamp(MIN_HORIZON_WEEKS, MAX_HORIZON_WEEKS) as u32
}

/// Project the weekly trajectory from start to target.
///
/// Defined only when there is weight to lose and an effective deficit.
pub fn project_weight_loss(input: &ProjectionInput) -> ProjectionOutcome {
    let total_loss = input.start_weight_kg - input.target_weight_kg;
    if total_loss <= 0.0 {
        return ProjectionOutcome::Unavailable {
            reason: UnavailableReason::NoLossNeeded,
        };
    }
    if input.real_deficit <= 0.0 {
        return ProjectionOutcome::Unavailable {
            reason: UnavailableReason::NoDeficit,
        };
    }

    let weekly_loss_kg = weekly_loss_kg(input.real_deficit);
    let estimated_weeks = total_loss / weekly_loss_kg;
    let horizon_weeks = projection_horizon_weeks(estimated_weeks);

    let points = (0..=horizon_weeks)
        .map(|week| ProjectionPoint {
            week,
            weight_kg: (input.start_weight_kg - weekly_loss_kg * week as f64)
                .max(input.target_weight_kg),
        })
        .collect();

    ProjectionOutcome::Available(Projection {
        weekly_loss_kg,
        estimated_weeks,
        horizon_weeks,
        points,
    })
}

/// Complete plan for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub bmr: f64,
    pub activity: ActivityFactor,
    pub tdee: f64,
    pub calories: CalorieTarget,
    pub protein_g: f64,
    pub projection: ProjectionOutcome,
    pub projection_input: ProjectionInput,
}

/// Run the full calculation: BMR, activity, TDEE, deficit, floor, protein
/// and projection.
pub fn calculate_plan(profile: &Profile) -> Plan {
    let bmr = calculate_bmr_mifflin(
        profile.current_weight_kg,
        profile.height_cm,
        profile.age_years,
        profile.sex,
    );
    let activity = calculate_activity_factor(&profile.activity);
    let tdee = calculate_tdee(bmr, activity.value);
    let deficit = resolve_deficit(profile.deficit, tdee);
    let calories = calculate_calorie_target(tdee, deficit, profile.sex);

    let projection_input = ProjectionInput {
        start_weight_kg: profile.current_weight_kg,
        target_weight_kg: profile.target_weight_kg,
        real_deficit: calories.real_deficit,
    };

    Plan {
        bmr,
        activity,
        tdee,
        calories,
        protein_g: protein_target_g(profile.current_weight_kg),
        projection: project_weight_loss(&projection_input),
        projection_input,
    }
}
