//! Energy expenditure calculations
//!
//! BMR, activity factors, TDEE, deficit resolution and the protein
//! guideline used by the plan calculator.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: no I/O, no clock, no shared state
//! 2. **Closed Tables**: every lookup is a total `match` over an enum
//! 3. **Named Bounds**: every clamp and floor is a public constant

use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Auto mode deficit as a share of TDEE
pub const AUTO_DEFICIT_RATIO: f64 = 0.20;
/// Auto mode deficit bounds (kcal/day)
pub const AUTO_DEFICIT_MIN_KCAL: f64 = 300.0;
pub const AUTO_DEFICIT_MAX_KCAL: f64 = 800.0;
/// Protein guideline in grams per kg of body weight
pub const PROTEIN_G_PER_KG: f64 = 1.6;
/// Advisory range for a decomposed activity factor
pub const ACTIVITY_FACTOR_ADVISORY_RANGE: (f64, f64) = (1.4, 1.8);

/// Lowercase, trim, and map separators to `_` so that `"Very-High"` and
/// `"very high"` both parse as `very_high`.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

// ============================================================================
// Biological sex
// ============================================================================

/// Biological sex for physiological calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Female,
    Male,
}

impl BiologicalSex {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiologicalSex::Female => "female",
            BiologicalSex::Male => "male",
        }
    }

    /// Calorie target floor (kcal/day)
    pub fn min_calories(&self) -> f64 {
        match self {
            BiologicalSex::Female => 1200.0,
            BiologicalSex::Male => 1500.0,
        }
    }
}

impl fmt::Display for BiologicalSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BiologicalSex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "female" => Ok(BiologicalSex::Female),
            "male" => Ok(BiologicalSex::Male),
            _ => Err(CoreError::unknown("biological sex", s)),
        }
    }
}

// ============================================================================
// Activity factor tables
// ============================================================================

/// Single-factor activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    High,
    VeryHigh,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::High,
        ActivityLevel::VeryHigh,
    ];

    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::High => 1.725,
            ActivityLevel::VeryHigh => 1.9,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::Light => "Light exercise 1-3 days/week",
            ActivityLevel::Moderate => "Moderate exercise 3-5 days/week",
            ActivityLevel::High => "Hard exercise 6-7 days/week",
            ActivityLevel::VeryHigh => "Very hard exercise or physical job",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::High => "high",
            ActivityLevel::VeryHigh => "very_high",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "high" => Ok(ActivityLevel::High),
            "very_high" => Ok(ActivityLevel::VeryHigh),
            _ => Err(CoreError::unknown("activity level", s)),
        }
    }
}

/// Occupational activity outside of sport (PAb)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobActivity {
    VeryLow,
    Low,
    Moderate,
    High,
}

impl JobActivity {
    pub const ALL: [JobActivity; 4] = [
        JobActivity::VeryLow,
        JobActivity::Low,
        JobActivity::Moderate,
        JobActivity::High,
    ];

    /// Base activity factor contributed by the job
    pub fn base_factor(&self) -> f64 {
        match self {
            JobActivity::VeryLow => 1.4,
            JobActivity::Low => 1.5,
            JobActivity::Moderate => 1.6,
            JobActivity::High => 1.7,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            JobActivity::VeryLow => "Seated work. E.g. office, developer, accountant, driver.",
            JobActivity::Low => "Standing or light walking. E.g. teacher, salesperson, hairdresser.",
            JobActivity::Moderate => {
                "Physically active. E.g. waiter, cleaning, care assistant, physiotherapist."
            }
            JobActivity::High => "Very physical. E.g. construction, removals, farming.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobActivity::VeryLow => "very_low",
            JobActivity::Low => "low",
            JobActivity::Moderate => "moderate",
            JobActivity::High => "high",
        }
    }
}

impl FromStr for JobActivity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "very_low" => Ok(JobActivity::VeryLow),
            "low" => Ok(JobActivity::Low),
            "moderate" => Ok(JobActivity::Moderate),
            "high" => Ok(JobActivity::High),
            _ => Err(CoreError::unknown("job activity", s)),
        }
    }
}

/// Sport intensity (PAs coefficient per weekly hour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportIntensity {
    Low,
    Moderate,
    High,
}

impl SportIntensity {
    pub const ALL: [SportIntensity; 3] = [
        SportIntensity::Low,
        SportIntensity::Moderate,
        SportIntensity::High,
    ];

    pub fn coefficient(&self) -> f64 {
        match self {
            SportIntensity::Low => 0.02,
            SportIntensity::Moderate => 0.04,
            SportIntensity::High => 0.06,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SportIntensity::Low => "Yoga, stretching, slow walking.",
            SportIntensity::Moderate => "Brisk walking, cycling, easy swimming.",
            SportIntensity::High => "Jogging, HIIT, cross-training, squash.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SportIntensity::Low => "low",
            SportIntensity::Moderate => "moderate",
            SportIntensity::High => "high",
        }
    }
}

impl FromStr for SportIntensity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "low" => Ok(SportIntensity::Low),
            "moderate" => Ok(SportIntensity::Moderate),
            "high" => Ok(SportIntensity::High),
            _ => Err(CoreError::unknown("sport intensity", s)),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(ActivityLevel, JobActivity, SportIntensity);

/// How the activity factor is derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ActivityProfile {
    /// One multiplier from the classic table
    Single { level: ActivityLevel },
    /// `PA = PAb + PAs`, job factor plus weekly sport contribution
    Decomposed {
        job: JobActivity,
        sport: SportIntensity,
        sport_hours_per_week: f64,
    },
}

/// Non-blocking notice that a decomposed PA left its advisory range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityWarning {
    pub value: f64,
    pub expected_min: f64,
    pub expected_max: f64,
}

impl fmt::Display for ActivityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "activity factor {:.2} is outside the usual {:.1}-{:.1} range; check job level and sport hours",
            self.value, self.expected_min, self.expected_max
        )
    }
}

/// Resolved activity factor with its components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityFactor {
    /// PAb (or the single-table multiplier)
    pub base: f64,
    /// PAs, zero for the single-factor model
    pub sport: f64,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ActivityWarning>,
}

/// Resolve the activity factor for either model.
///
/// Only the decomposed model carries an advisory range check; the
/// computation always proceeds.
pub fn calculate_activity_factor(activity: &ActivityProfile) -> ActivityFactor {
    match *activity {
        ActivityProfile::Single { level } => ActivityFactor {
            base: level.multiplier(),
            sport: 0.0,
            value: level.multiplier(),
            warning: None,
        },
        ActivityProfile::Decomposed {
            job,
            sport,
            sport_hours_per_week,
        } => {
            let base = job.base_factor();
            let sport = sport.coefficient() * sport_hours_per_week;
            let value = base + sport;
            let (min, max) = ACTIVITY_FACTOR_ADVISORY_RANGE;
            let warning = (value < min || value > max).then_some(ActivityWarning {
                value,
                expected_min: min,
                expected_max: max,
            });
            ActivityFactor {
                base,
                sport,
                value,
                warning,
            }
        }
    }
}

// ============================================================================
// BMR and TDEE
// ============================================================================

/// Calculate Basal Metabolic Rate using Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
///
/// Inputs are expected inside the validated ranges; no runtime check here.
pub fn calculate_bmr_mifflin(weight_kg: f64, height_cm: f64, age_years: u32, sex: BiologicalSex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    match sex {
        BiologicalSex::Male => base + 5.0,
        BiologicalSex::Female => base - 161.0,
    }
}

/// TDEE = BMR × activity factor
pub fn calculate_tdee(bmr: f64, activity_factor: f64) -> f64 {
    bmr * activity_factor
}

// ============================================================================
// Deficit and calorie target
// ============================================================================

/// How the daily deficit is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeficitMode {
    /// 20% of TDEE, clamped to 300-800 kcal
    Auto,
    Custom { kcal_per_day: f64 },
}

impl DeficitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeficitMode::Auto => "auto",
            DeficitMode::Custom { .. } => "custom",
        }
    }
}

/// Nominal deficit before the calorie floor is applied.
///
/// Custom values below zero are treated as zero.
pub fn resolve_deficit(mode: DeficitMode, tdee: f64) -> f64 {
    match mode {
        DeficitMode::Auto => {
            (AUTO_DEFICIT_RATIO * tdee).clamp(AUTO_DEFICIT_MIN_KCAL, AUTO_DEFICIT_MAX_KCAL)
        }
        DeficitMode::Custom { kcal_per_day } => kcal_per_day.max(0.0),
    }
}

/// Daily calorie target after the sex-specific floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieTarget {
    pub nominal_deficit: f64,
    pub target_calories: f64,
    /// `max(0, TDEE - target)`; smaller than nominal when the floor binds
    pub real_deficit: f64,
    pub min_calories: f64,
    pub floor_applied: bool,
}

/// Apply the deficit to TDEE and clamp the result to the calorie floor.
pub fn calculate_calorie_target(tdee: f64, nominal_deficit: f64, sex: BiologicalSex) -> CalorieTarget {
    let min_calories = sex.min_calories();
    let raw_target = tdee - nominal_deficit;
    let floor_applied = raw_target < min_calories;
    let target_calories = raw_target.max(min_calories);

    CalorieTarget {
        nominal_deficit,
        target_calories,
        real_deficit: (tdee - target_calories).max(0.0),
        min_calories,
        floor_applied,
    }
}

/// Daily protein guideline in grams, advisory only
pub fn protein_target_g(weight_kg: f64) -> f64 {
    PROTEIN_G_PER_KG * weight_kg
}
