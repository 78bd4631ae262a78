//! Integration tests for weight tracking endpoints

mod common;

use axum::http::StatusCode;
use common::assert_close;
use rstest::rstest;
use serde_json::json;
use weight_plan_backend::config::StorageBackend;

fn app_for(backend: StorageBackend) -> common::TestApp {
    match backend {
        StorageBackend::Memory => common::TestApp::new(),
        other => common::TestApp::with_backend(other),
    }
}

#[rstest]
#[case(StorageBackend::Memory)]
#[case(StorageBackend::FlatFile)]
#[case(StorageBackend::Sheet)]
#[tokio::test]
async fn test_log_weight_upserts_by_date(#[case] backend: StorageBackend) {
    let app = app_for(backend);

    let (status, first) = app
        .send_json(
            "POST",
            "/api/v1/weight",
            Some("alice"),
            &json!({ "date": "2024-01-01", "weight_kg": 71.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "inserted");

    let (status, second) = app
        .send_json(
            "POST",
            "/api/v1/weight",
            Some("alice"),
            &json!({ "date": "2024-01-01", "weight_kg": 70.4 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["status"], "updated");
    assert_eq!(second["previous_weight_kg"], 71.0);

    let (_, tracking) = app.get_json("/api/v1/weight", Some("alice")).await;
    let points = tracking["measurements"].as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["weight_kg"], 70.4);
}

#[rstest]
#[case(StorageBackend::Memory)]
#[case(StorageBackend::FlatFile)]
#[case(StorageBackend::Sheet)]
#[tokio::test]
async fn test_tracking_trend_and_week_axis(#[case] backend: StorageBackend) {
    let app = app_for(backend);

    // Out of order on purpose; the view is always date-ordered
    let entries = [
        ("2024-01-08", 70.0),
        ("2024-01-01", 70.0),
        ("2024-01-02", 70.0),
        ("2024-01-03", 70.0),
        ("2024-01-04", 70.0),
        ("2024-01-05", 70.0),
        ("2024-01-06", 70.0),
        ("2024-01-07", 70.0),
    ];
    for (date, weight) in entries {
        let (status, _) = app
            .send_json(
                "POST",
                "/api/v1/weight",
                None,
                &json!({ "date": date, "weight_kg": weight }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    app.send_json(
        "POST",
        "/api/v1/weight",
        None,
        &json!({ "date": "2024-01-09", "weight_kg": 63.0 }),
    )
    .await;

    let (status, body) = app.get_json("/api/v1/weight", None).await;
    assert_eq!(status, StatusCode::OK);

    let points = body["measurements"].as_array().unwrap();
    assert_eq!(points.len(), 9);
    assert_eq!(points[0]["date"], "2024-01-01");
    assert_close(&points[7]["week"], 1.0);
    assert_close(&points[6]["trend_kg"], 70.0);
    assert_close(&points[8]["trend_kg"], 69.0);

    let indicators = &body["indicators"];
    assert_eq!(indicators["entries_count"], 9);
    assert_close(&indicators["net_change_kg"], -7.0);
    assert_close(&indicators["trend_weight_kg"], 69.0);
    assert_eq!(body["projection"]["status"], "available");
}

#[tokio::test]
async fn test_trend_hidden_below_full_window() {
    let app = common::TestApp::new();
    for day in 1..=3 {
        app.send_json(
            "POST",
            "/api/v1/weight",
            None,
            &json!({ "date": format!("2024-02-0{day}"), "weight_kg": 80.0 }),
        )
        .await;
    }

    let (_, body) = app.get_json("/api/v1/weight", None).await;
    assert_eq!(body["indicators"]["entries_count"], 3);
    assert!(body["indicators"]["trend_weight_kg"].is_null());
}

#[tokio::test]
async fn test_empty_history() {
    let app = common::TestApp::new();

    let (status, body) = app.get_json("/api/v1/weight", Some("nobody")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["measurements"].as_array().unwrap().is_empty());
    assert!(body.get("indicators").is_none());
}

#[rstest]
#[case(19.0)]
#[case(300.5)]
#[tokio::test]
async fn test_log_weight_rejects_out_of_range(#[case] weight: f64) {
    let app = common::TestApp::new();

    let (status, body) = app
        .send_json(
            "POST",
            "/api/v1/weight",
            None,
            &json!({ "date": "2024-01-01", "weight_kg": weight }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "weight_kg");
}

#[tokio::test]
async fn test_log_weight_defaults_date_to_today() {
    let app = common::TestApp::new();

    let (status, body) = app
        .send_json("POST", "/api/v1/weight", None, &json!({ "weight_kg": 75.5 }))
        .await;

    assert_eq!(status, StatusCode::OK);
    let today = chrono::Utc::now().date_naive().to_string();
    assert_eq!(body["date"], today);
}

#[tokio::test]
async fn test_identities_are_isolated_and_case_insensitive() {
    let app = common::TestApp::with_backend(StorageBackend::FlatFile);

    app.send_json(
        "POST",
        "/api/v1/weight",
        Some("Alice"),
        &json!({ "date": "2024-01-01", "weight_kg": 60.0 }),
    )
    .await;

    let (_, alice) = app.get_json("/api/v1/weight", Some(" alice ")).await;
    let (_, bob) = app.get_json("/api/v1/weight", Some("bob")).await;
    let (_, single) = app.get_json("/api/v1/weight", None).await;

    assert_eq!(alice["measurements"].as_array().unwrap().len(), 1);
    assert!(bob["measurements"].as_array().unwrap().is_empty());
    assert!(single["measurements"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_identity_is_rejected() {
    let app = common::TestApp::new();

    let (status, body) = app.get_json("/api/v1/weight", Some("a/b")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "identity");
}

#[rstest]
#[case(StorageBackend::Memory)]
#[case(StorageBackend::Sheet)]
#[tokio::test]
async fn test_reset_clears_only_own_partition(#[case] backend: StorageBackend) {
    let app = app_for(backend);
    for user in ["alice", "bob"] {
        for day in 1..=2 {
            app.send_json(
                "POST",
                "/api/v1/weight",
                Some(user),
                &json!({ "date": format!("2024-03-0{day}"), "weight_kg": 65.0 }),
            )
            .await;
        }
    }

    let (status, body) = app
        .request("DELETE", "/api/v1/weight", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["removed"], 2);

    let (_, alice) = app.get_json("/api/v1/weight", Some("alice")).await;
    let (_, bob) = app.get_json("/api/v1/weight", Some("bob")).await;
    assert!(alice["measurements"].as_array().unwrap().is_empty());
    assert_eq!(bob["measurements"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_export_csv() {
    let app = common::TestApp::new();
    for (date, weight) in [("2024-01-02", 70.5), ("2024-01-01", 71.0)] {
        app.send_json(
            "POST",
            "/api/v1/weight",
            None,
            &json!({ "date": date, "weight_kg": weight }),
        )
        .await;
    }

    let (status, body) = app.get("/api/v1/weight/export").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "date,weight\n2024-01-01,71\n2024-01-02,70.5\n");
}

#[tokio::test]
async fn test_suggested_weight_falls_back_to_profile() {
    let app = common::TestApp::new();

    let (status, body) = app.get_json("/api/v1/weight/suggested", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "profile");
    assert_eq!(body["weight_kg"], 70.0);

    app.send_json(
        "POST",
        "/api/v1/weight",
        None,
        &json!({ "date": "2024-01-01", "weight_kg": 68.2 }),
    )
    .await;

    let (_, body) = app.get_json("/api/v1/weight/suggested", None).await;
    assert_eq!(body["source"], "last_measurement");
    assert_eq!(body["weight_kg"], 68.2);
}

#[tokio::test]
async fn test_concurrent_writes_for_one_identity_are_all_kept() {
    let app = std::sync::Arc::new(common::TestApp::with_backend(StorageBackend::FlatFile));

    let handles: Vec<_> = (1..=20)
        .map(|day| {
            let app = std::sync::Arc::clone(&app);
            tokio::spawn(async move {
                let date = chrono::NaiveDate::from_ymd_opt(2024, 4, day).unwrap();
                app.send_json(
                    "POST",
                    "/api/v1/weight",
                    Some("carol"),
                    &json!({ "date": date, "weight_kg": 80.0 }),
                )
                .await
                .0
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let (_, body) = app.get_json("/api/v1/weight", Some("carol")).await;
    assert_eq!(body["measurements"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_tracking_draws_supplied_plan() {
    let app = common::TestApp::new();
    let (status, plan) = app
        .send_json(
            "POST",
            "/api/v1/plan",
            None,
            &json!({
                "current_weight_kg": 80.0,
                "height_cm": 170.0,
                "age_years": 40,
                "sex": "male",
                "activity": {"model": "single", "level": "moderate"},
                "target_weight_kg": 70.0,
                "deficit": {"mode": "auto"}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let input = &plan["plan"]["projection_input"];
    let path = format!(
        "/api/v1/weight?start_weight_kg={}&target_weight_kg={}&real_deficit={}",
        input["start_weight_kg"], input["target_weight_kg"], input["real_deficit"]
    );
    let (status, body) = app.get_json(&path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["projection"], plan["plan"]["projection"]);
    assert_close(&body["projection"]["points"][0]["weight_kg"], 80.0);

    // Without a plan the unsaved default profile is projected
    let (_, stored) = app.get_json("/api/v1/weight", None).await;
    assert_close(&stored["projection"]["points"][0]["weight_kg"], 70.0);
}

#[tokio::test]
async fn test_tracking_rejects_partial_plan() {
    let app = common::TestApp::new();

    let (status, body) = app
        .get_json("/api/v1/weight?start_weight_kg=80", None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "projection");
}
