//! Integration tests for plan endpoints

mod common;

use axum::http::StatusCode;
use common::assert_close;
use serde_json::json;

fn reference_profile() -> serde_json::Value {
    json!({
        "current_weight_kg": 80.0,
        "height_cm": 170.0,
        "age_years": 40,
        "sex": "male",
        "activity": { "model": "single", "level": "moderate" },
        "target_weight_kg": 70.0,
        "deficit": { "mode": "auto" }
    })
}

#[tokio::test]
async fn test_compute_plan_reference_profile() {
    let app = common::TestApp::new();

    let (status, body) = app
        .send_json("POST", "/api/v1/plan", None, &reference_profile())
        .await;

    assert_eq!(status, StatusCode::OK);
    let plan = &body["plan"];
    assert_close(&plan["bmr"], 1667.5);
    assert_close(&plan["tdee"], 2584.625);
    assert_close(&plan["calories"]["nominal_deficit"], 516.925);
    assert_close(&plan["calories"]["target_calories"], 2067.7);
    assert_eq!(plan["calories"]["floor_applied"], false);
    assert_close(&plan["protein_g"], 128.0);
    assert_eq!(plan["projection"]["status"], "available");
    assert_eq!(plan["projection"]["horizon_weeks"], 23);
    assert_eq!(plan["projection"]["points"][0]["weight_kg"], 80.0);
}

#[tokio::test]
async fn test_compute_plan_no_loss_needed() {
    let app = common::TestApp::new();
    let mut profile = reference_profile();
    profile["target_weight_kg"] = json!(85.0);

    let (status, body) = app.send_json("POST", "/api/v1/plan", None, &profile).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["projection"]["status"], "unavailable");
    assert_eq!(body["plan"]["projection"]["reason"], "no_loss_needed");
}

#[tokio::test]
async fn test_compute_plan_decomposed_warns_outside_range() {
    let app = common::TestApp::new();
    let mut profile = reference_profile();
    profile["activity"] = json!({
        "model": "decomposed",
        "job": "high",
        "sport": "high",
        "sport_hours_per_week": 10.0
    });

    let (status, body) = app.send_json("POST", "/api/v1/plan", None, &profile).await;

    assert_eq!(status, StatusCode::OK);
    assert_close(&body["plan"]["activity"]["value"], 2.3);
    assert!(body["plan"]["activity"]["warning"].is_object());
}

#[tokio::test]
async fn test_compute_plan_rejects_invalid_custom_deficit() {
    let app = common::TestApp::new();
    let mut profile = reference_profile();
    profile["deficit"] = json!({ "mode": "custom", "kcal_per_day": 525.0 });

    let (status, body) = app.send_json("POST", "/api/v1/plan", None, &profile).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "deficit");
}

#[tokio::test]
async fn test_stored_plan_uses_defaults_without_profile() {
    let app = common::TestApp::new();

    let (status, body) = app.get_json("/api/v1/plan", Some("newcomer")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["current_weight_kg"], 70.0);
    assert_eq!(body["profile"]["sex"], "female");
    assert_eq!(body["plan"]["projection"]["status"], "available");
}

#[tokio::test]
async fn test_activity_options_lists_tables() {
    let app = common::TestApp::new();

    let (status, body) = app.get_json("/api/v1/plan/options", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activity_levels"].as_array().unwrap().len(), 5);
    assert_eq!(body["job_activities"].as_array().unwrap().len(), 4);
    assert_eq!(body["sport_intensities"].as_array().unwrap().len(), 3);
    assert_eq!(body["job_activities"][0]["key"], "very_low");
}
