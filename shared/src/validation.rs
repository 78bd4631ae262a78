//! Input validation functions
//!
//! Range checks mirroring the constraints of the plan form. The calculator
//! itself assumes these have already been applied.

use crate::health_metrics::{ActivityProfile, DeficitMode};
use crate::plan::ProjectionInput;
use crate::profile::Profile;

pub const WEIGHT_RANGE_KG: (f64, f64) = (20.0, 300.0);
pub const HEIGHT_RANGE_CM: (f64, f64) = (120.0, 230.0);
pub const AGE_RANGE_YEARS: (u32, u32) = (10, 120);
pub const CUSTOM_DEFICIT_RANGE_KCAL: (f64, f64) = (200.0, 1000.0);
pub const CUSTOM_DEFICIT_STEP_KCAL: f64 = 50.0;
pub const SPORT_HOURS_RANGE: (f64, f64) = (0.0, 40.0);
pub const SPORT_HOURS_STEP: f64 = 0.5;
pub const IDENTITY_MAX_LEN: usize = 128;

fn ensure_finite(value: f64, what: &str) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err(format!("{} must be a valid number", what));
    }
    Ok(())
}

fn is_multiple_of(value: f64, step: f64) -> bool {
    let ratio = value / step;
    (ratio - ratio.round()).abs() < 1e-9
}

/// Validate weight value (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    ensure_finite(weight_kg, "Weight")?;
    let (min, max) = WEIGHT_RANGE_KG;
    if weight_kg < min {
        return Err(format!("Weight must be at least {} kg", min));
    }
    if weight_kg > max {
        return Err(format!("Weight must be at most {} kg", max));
    }
    Ok(())
}

/// Validate height value (in cm)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    ensure_finite(height_cm, "Height")?;
    let (min, max) = HEIGHT_RANGE_CM;
    if height_cm < min {
        return Err(format!("Height must be at least {} cm", min));
    }
    if height_cm > max {
        return Err(format!("Height must be at most {} cm", max));
    }
    Ok(())
}

pub fn validate_age(age_years: u32) -> Result<(), String> {
    let (min, max) = AGE_RANGE_YEARS;
    if age_years < min || age_years > max {
        return Err(format!("Age must be between {} and {} years", min, max));
    }
    Ok(())
}

/// Validate a user-chosen deficit: 200-1000 kcal in steps of 50
pub fn validate_custom_deficit(kcal_per_day: f64) -> Result<(), String> {
    ensure_finite(kcal_per_day, "Deficit")?;
    let (min, max) = CUSTOM_DEFICIT_RANGE_KCAL;
    if kcal_per_day < min || kcal_per_day > max {
        return Err(format!("Deficit must be between {} and {} kcal/day", min, max));
    }
    if !is_multiple_of(kcal_per_day, CUSTOM_DEFICIT_STEP_KCAL) {
        return Err(format!(
            "Deficit must be a multiple of {} kcal",
            CUSTOM_DEFICIT_STEP_KCAL
        ));
    }
    Ok(())
}

pub fn validate_sport_hours(hours_per_week: f64) -> Result<(), String> {
    ensure_finite(hours_per_week, "Sport hours")?;
    let (min, max) = SPORT_HOURS_RANGE;
    if hours_per_week < min || hours_per_week > max {
        return Err(format!("Sport hours must be between {} and {} per week", min, max));
    }
    if !is_multiple_of(hours_per_week, SPORT_HOURS_STEP) {
        return Err(format!("Sport hours must be a multiple of {}", SPORT_HOURS_STEP));
    }
    Ok(())
}

/// Validate an already-normalized identity key
pub fn validate_identity(identity: &str) -> Result<(), String> {
    if identity.is_empty() {
        return Err("Identity cannot be empty".to_string());
    }
    if identity.len() > IDENTITY_MAX_LEN {
        return Err("Identity too long".to_string());
    }
    if identity.chars().any(|c| c.is_control() || c == '/' || c == '\\') {
        return Err("Identity contains invalid characters".to_string());
    }
    if identity == "." || identity == ".." {
        return Err("Identity contains invalid characters".to_string());
    }
    Ok(())
}

/// A rejected profile field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Check every range constraint of a profile, stopping at the first failure
pub fn validate_profile(profile: &Profile) -> Result<(), FieldViolation> {
    let check = |field: &'static str, result: Result<(), String>| {
        result.map_err(|message| FieldViolation { field, message })
    };

    check("current_weight_kg", validate_weight(profile.current_weight_kg))?;
    check("target_weight_kg", validate_weight(profile.target_weight_kg))?;
    check("height_cm", validate_height_cm(profile.height_cm))?;
    check("age_years", validate_age(profile.age_years))?;

    if let DeficitMode::Custom { kcal_per_day } = profile.deficit {
        check("deficit", validate_custom_deficit(kcal_per_day))?;
    }
    if let ActivityProfile::Decomposed {
        sport_hours_per_week,
        ..
    } = profile.activity
    {
        check("sport_hours_per_week", validate_sport_hours(sport_hours_per_week))?;
    }
    Ok(())
}

/// Check a plan handed in by the caller instead of derived from a profile
pub fn validate_projection_input(input: &ProjectionInput) -> Result<(), FieldViolation> {
    let check = |field: &'static str, result: Result<(), String>| {
        result.map_err(|message| FieldViolation { field, message })
    };

    check("start_weight_kg", validate_weight(input.start_weight_kg))?;
    check("target_weight_kg", validate_weight(input.target_weight_kg))?;
    check("real_deficit", ensure_finite(input.real_deficit, "Deficit"))
}
