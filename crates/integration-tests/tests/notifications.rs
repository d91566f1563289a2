//! Notification proxy tests against a stub notification service.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;

use bazaar_integration_tests::{TestApp, closed_addr, spawn_stub};

/// What the stub saw for one call.
#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path_and_query: String,
    user_id: Option<String>,
    authorization: Option<String>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

async fn stub(State(log): State<Log>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    log.lock().unwrap().push(Seen {
        method: method.clone(),
        path_and_query: uri
            .path_and_query()
            .map(ToString::to_string)
            .unwrap_or_default(),
        user_id: header("x-user-id"),
        authorization: header("authorization"),
    });

    match (method, uri.path()) {
        (Method::GET, "/api/notifications") => Json(json!({
            "notifications": [{ "id": "n1", "title": "Order shipped", "read": false }],
            "unread": 1
        }))
        .into_response(),
        (Method::PUT, "/api/notifications/read-all") => StatusCode::OK.into_response(),
        (Method::PUT, "/api/notifications/n1/read") => {
            Json(json!({ "id": "n1", "read": true })).into_response()
        }
        (Method::DELETE, "/api/notifications/n1") => StatusCode::NO_CONTENT.into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "notification not found" })),
        )
            .into_response(),
    }
}

async fn start_stub() -> (String, Log) {
    let log = Log::default();
    let router = Router::new().fallback(stub).with_state(log.clone());
    let addr = spawn_stub(router).await;
    (format!("http://{addr}/api/"), log)
}

#[tokio::test]
async fn test_list_is_forwarded_verbatim() {
    let (base, log) = start_stub().await;
    let app = TestApp::builder()
        .notifications(&base)
        .notification_token("svc-token")
        .build();
    let cookie = app.login_customer(42).await;

    let response = app
        .get("/notifications?unread=true&page=2", Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "notifications": [{ "id": "n1", "title": "Order shipped", "read": false }],
            "unread": 1
        })
    );

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].path_and_query, "/api/notifications?unread=true&page=2");
    assert_eq!(seen[0].user_id.as_deref(), Some("42"));
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer svc-token"));
}

#[tokio::test]
async fn test_mark_read_and_delete() {
    let (base, log) = start_stub().await;
    let app = TestApp::builder().notifications(&base).build();
    let cookie = app.login_customer(7).await;

    let read = app.put("/notifications/n1/read", Some(&cookie), None).await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body, json!({ "id": "n1", "read": true }));

    let deleted = app.delete("/notifications/n1", Some(&cookie)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen[0].method, Method::PUT);
    assert_eq!(seen[0].path_and_query, "/api/notifications/n1/read");
    assert_eq!(seen[1].method, Method::DELETE);
    assert_eq!(seen[1].path_and_query, "/api/notifications/n1");
    assert!(seen.iter().all(|s| s.user_id.as_deref() == Some("7")));
    assert!(seen.iter().all(|s| s.authorization.is_none()));
}

#[tokio::test]
async fn test_mark_all_read_with_empty_body_is_no_content() {
    let (base, _log) = start_stub().await;
    let app = TestApp::builder().notifications(&base).build();
    let cookie = app.login_customer(7).await;

    let response = app.put("/notifications/read-all", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_remote_error_passes_through() {
    let (base, _log) = start_stub().await;
    let app = TestApp::builder().notifications(&base).build();
    let cookie = app.login_customer(7).await;

    let response = app.put("/notifications/zzz/read", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "message": "notification not found" }));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let slow = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        StatusCode::OK
    });
    let addr = spawn_stub(slow).await;
    let app = TestApp::builder()
        .notifications(&format!("http://{addr}/"))
        .notification_timeout(Duration::from_millis(200))
        .build();
    let cookie = app.login_customer(7).await;

    let response = app.get("/notifications", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        response.body,
        json!({ "error": "Notification service timed out" })
    );
}

#[tokio::test]
async fn test_unreachable_service_is_bad_gateway() {
    let addr = closed_addr().await;
    let app = TestApp::builder()
        .notifications(&format!("http://{addr}/"))
        .build();
    let cookie = app.login_customer(7).await;

    let response = app.get("/notifications", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.body,
        json!({ "error": "Notification service error" })
    );
}

#[tokio::test]
async fn test_requires_sign_in_and_never_calls_remote() {
    let (base, log) = start_stub().await;
    let app = TestApp::builder().notifications(&base).build();

    assert_eq!(
        app.get("/notifications", None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.put("/notifications/read-all", None, None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.delete("/notifications/n1", None).await.status,
        StatusCode::UNAUTHORIZED
    );

    assert!(log.lock().unwrap().is_empty());
}
