//! Common test utilities and helpers
//!
//! - In-memory store fixtures
//! - Request helpers driving the router without a listening socket

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use plancollab::backend::routes::create_router;
use plancollab::backend::server::config::load_database;
use plancollab::backend::AppState;
use plancollab::shared::AppConfig;

/// In-memory store, static pages served from a directory that does not exist
pub fn test_config() -> AppConfig {
    AppConfig::builder()
        .database_url("sqlite::memory:")
        .static_dir("tests/no-static")
        .build()
        .expect("valid test config")
}

/// App state over a fresh, migrated in-memory database
pub async fn create_test_state() -> AppState {
    let pool = load_database(&test_config())
        .await
        .expect("Failed to create test database");
    AppState::new(pool)
}

/// Router over `state` with the test configuration
pub fn create_test_app(state: &AppState) -> Router {
    create_router(state.clone(), &test_config())
}

/// Send a request and decode the JSON response body (`Null` when empty)
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}
