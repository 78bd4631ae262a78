//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory or temp-dir backed store and
//! drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use weight_plan_backend::{
    config::{AppConfig, StorageBackend},
    identity::USER_ID_HEADER,
    routes,
    state::AppState,
};

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    /// Keeps the data directory alive for file-backed stores
    pub data_dir: Option<TempDir>,
}

impl TestApp {
    /// Application over the in-memory store
    pub fn new() -> Self {
        let mut config = test_config();
        config.storage.backend = StorageBackend::Memory;
        Self::with_config(config, None)
    }

    /// Application over a file-backed store in a fresh temp directory
    pub fn with_backend(backend: StorageBackend) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = test_config();
        config.storage.backend = backend;
        config.storage.data_dir = dir.path().to_path_buf();
        Self::with_config(config, Some(dir))
    }

    fn with_config(config: AppConfig, data_dir: Option<TempDir>) -> Self {
        let state = AppState::from_config(config);
        let app = routes::create_router(state.clone());
        Self {
            app,
            state,
            data_dir,
        }
    }

    /// Send a request, optionally as `user`, returning status and body text
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        user: Option<&str>,
        body: Option<&Value>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        self.request("GET", path, None, None).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, String) {
        self.request("POST", path, None, Some(body)).await
    }

    /// GET as `user`, parsing the JSON body
    pub async fn get_json(&self, path: &str, user: Option<&str>) -> (StatusCode, Value) {
        let (status, body) = self.request("GET", path, user, None).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    /// Send JSON as `user`, parsing the JSON body
    pub async fn send_json(
        &self,
        method: &str,
        path: &str,
        user: Option<&str>,
        body: &Value,
    ) -> (StatusCode, Value) {
        let (status, body) = self.request(method, path, user, Some(body)).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config
}

pub fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap_or(f64::NAN);
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
