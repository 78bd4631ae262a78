//! Weight Plan WASM Module
//!
//! WebAssembly bindings so the browser can compute plans and trend lines
//! without a round trip. Structured values cross the boundary as JSON
//! strings in the same shapes the HTTP API uses.

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;
use weight_plan_shared::health_metrics::{calculate_bmr_mifflin, BiologicalSex};
use weight_plan_shared::types::{PlanResponse, TrackingResponse};
use weight_plan_shared::validation::{validate_profile, validate_projection_input};
use weight_plan_shared::{
    build_tracking_series, calculate_plan, project_weight_loss, CoreError, Measurement,
    MeasurementLog, Profile, ProjectionInput, TREND_WINDOW,
};

/// Trailing moving average with a shrinking window at the start
#[wasm_bindgen]
pub fn calculate_moving_average(values: &[f64], window_size: usize) -> Vec<f64> {
    weight_plan_shared::rolling_average(values, window_size)
}

/// Seven-entry trend line of a weight series
#[wasm_bindgen]
pub fn calculate_trend(values: &[f64]) -> Vec<f64> {
    weight_plan_shared::rolling_average(values, TREND_WINDOW)
}

/// Calculate BMR using the Mifflin-St Jeor equation
///
/// `sex` is "female" or "male"; anything else is an error.
#[wasm_bindgen]
pub fn calculate_bmr(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    sex: &str,
) -> Result<f64, JsError> {
    bmr(weight_kg, height_cm, age_years, sex).map_err(|e| JsError::new(&e))
}

/// Full plan for a profile given as JSON
#[wasm_bindgen]
pub fn calculate_plan_json(profile_json: &str) -> Result<String, JsError> {
    plan_json(profile_json).map_err(|e| JsError::new(&e))
}

/// Tracking view for `[{date, weight_kg}, ...]` given as JSON.
///
/// `projection_json` is an optional `{start_weight_kg, target_weight_kg,
/// real_deficit}` object, as found under `plan.projection_input` of
/// [`calculate_plan_json`]; when given its projection is included.
#[wasm_bindgen]
pub fn tracking_series_json(
    measurements_json: &str,
    projection_json: Option<String>,
) -> Result<String, JsError> {
    series_json(measurements_json, projection_json.as_deref()).map_err(|e| JsError::new(&e))
}

/// Week offsets of ISO dates relative to the earliest one
#[wasm_bindgen]
pub fn calculate_week_offsets(dates_json: &str) -> Result<Vec<f64>, JsError> {
    week_offsets(dates_json).map_err(|e| JsError::new(&e))
}

fn bmr(weight_kg: f64, height_cm: f64, age_years: u32, sex: &str) -> Result<f64, String> {
    let sex: BiologicalSex = sex.parse().map_err(|e: CoreError| e.to_string())?;
    Ok(calculate_bmr_mifflin(weight_kg, height_cm, age_years, sex))
}

fn plan_json(profile_json: &str) -> Result<String, String> {
    let profile: Profile = serde_json::from_str(profile_json).map_err(|e| e.to_string())?;
    validate_profile(&profile).map_err(|v| format!("{}: {}", v.field, v.message))?;
    let plan = calculate_plan(&profile);
    serde_json::to_string(&PlanResponse { profile, plan }).map_err(|e| e.to_string())
}

fn series_json(measurements_json: &str, projection_json: Option<&str>) -> Result<String, String> {
    let records: Vec<Measurement> =
        serde_json::from_str(measurements_json).map_err(|e| e.to_string())?;
    let projection = match projection_json {
        Some(raw) => {
            let input: ProjectionInput = serde_json::from_str(raw).map_err(|e| e.to_string())?;
            validate_projection_input(&input).map_err(|v| format!("{}: {}", v.field, v.message))?;
            Some(project_weight_loss(&input))
        }
        None => None,
    };

    let series = build_tracking_series(&MeasurementLog::from_records(records));
    let view = TrackingResponse {
        measurements: series.points,
        indicators: series.indicators,
        projection,
    };
    serde_json::to_string(&view).map_err(|e| e.to_string())
}

fn week_offsets(dates_json: &str) -> Result<Vec<f64>, String> {
    let mut dates: Vec<NaiveDate> = serde_json::from_str(dates_json).map_err(|e| e.to_string())?;
    dates.sort();
    Ok(weight_plan_shared::week_offsets(&dates))
}
