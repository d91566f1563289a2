//! Health and request-id middleware tests.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use bazaar_integration_tests::TestApp;

#[tokio::test]
async fn test_liveness() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!("ok"));
}

#[tokio::test]
async fn test_readiness_with_memory_stores() {
    let app = TestApp::new();

    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/nope", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
