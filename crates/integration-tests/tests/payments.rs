//! Payment gateway tests: disabled mode and a stub gateway.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;

use bazaar_integration_tests::{TestApp, spawn_stub};

const KEY_ID: &str = "rzp_test_abc123456";
const KEY_SECRET: &str = "s3cr3t";

type Bodies = Arc<Mutex<Vec<Value>>>;

async fn create_order(
    State(bodies): State<Bodies>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    bodies.lock().unwrap().push(body.clone());
    Json(json!({
        "id": "order_Test123",
        "entity": "order",
        "amount": body["amount"],
        "currency": body["currency"],
        "receipt": body["receipt"],
        "status": "created"
    }))
    .into_response()
}

async fn start_gateway() -> (String, Bodies) {
    let bodies = Bodies::default();
    let router = Router::new()
        .route("/v1/orders", post(create_order))
        .with_state(bodies.clone());
    let addr = spawn_stub(router).await;
    (format!("http://{addr}/v1/"), bodies)
}

fn sign(message: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(KEY_SECRET.as_bytes()).unwrap();
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[tokio::test]
async fn test_disabled_config_reports_not_enabled() {
    let app = TestApp::new();

    let response = app.get("/payments/config", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "enabled": false, "key_id": null }));
}

#[tokio::test]
async fn test_disabled_gateway_fails_fast() {
    let app = TestApp::new();
    let cookie = app.login_customer(1).await;

    let order = app
        .post(
            "/payments/orders",
            Some(&cookie),
            json!({ "amount": "499.50" }),
        )
        .await;
    assert_eq!(order.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(order.body, json!({ "error": "payment unavailable" }));

    // Disabled answers before the input is validated
    let verify = app
        .post(
            "/payments/verify",
            Some(&cookie),
            json!({ "order_id": "", "payment_id": "", "signature": "" }),
        )
        .await;
    assert_eq!(verify.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(verify.body, json!({ "error": "payment unavailable" }));
}

#[tokio::test]
async fn test_ready_config_exposes_key_id() {
    let (base, _bodies) = start_gateway().await;
    let app = TestApp::builder().payments(KEY_ID, KEY_SECRET, &base).build();

    let response = app.get("/payments/config", None).await;
    assert_eq!(response.body, json!({ "enabled": true, "key_id": KEY_ID }));
}

#[tokio::test]
async fn test_create_order_through_gateway() {
    let (base, bodies) = start_gateway().await;
    let app = TestApp::builder().payments(KEY_ID, KEY_SECRET, &base).build();
    let cookie = app.login_customer(1).await;

    let response = app
        .post(
            "/payments/orders",
            Some(&cookie),
            json!({ "amount": "499.50", "receipt": "cart-17" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["id"], json!("order_Test123"));
    assert_eq!(response.body["amount"], json!(49950));
    assert_eq!(response.body["currency"], json!("INR"));
    assert_eq!(response.body["status"], json!("created"));

    let sent = bodies.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![json!({ "amount": 49950, "currency": "INR", "receipt": "cart-17" })]
    );
}

#[tokio::test]
async fn test_orders_require_sign_in() {
    let (base, bodies) = start_gateway().await;
    let app = TestApp::builder().payments(KEY_ID, KEY_SECRET, &base).build();

    let response = app
        .post("/payments/orders", None, json!({ "amount": "10.00" }))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_amount_never_reaches_gateway() {
    let (base, bodies) = start_gateway().await;
    let app = TestApp::builder().payments(KEY_ID, KEY_SECRET, &base).build();
    let cookie = app.login_customer(1).await;

    for amount in ["0", "-5.00", "1.005"] {
        let response = app
            .post("/payments/orders", Some(&cookie), json!({ "amount": amount }))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "amount {amount}");
    }
    assert!(bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_gateway_rejection_is_bad_gateway() {
    let failing = Router::new().route(
        "/v1/orders",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "code": "BAD_REQUEST_ERROR" } })),
            )
        }),
    );
    let addr = spawn_stub(failing).await;
    let app = TestApp::builder()
        .payments(KEY_ID, KEY_SECRET, &format!("http://{addr}/v1/"))
        .build();
    let cookie = app.login_customer(1).await;

    let response = app
        .post("/payments/orders", Some(&cookie), json!({ "amount": "10.00" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body, json!({ "error": "Payment gateway error" }));
}

#[tokio::test]
async fn test_verify_signature() {
    let (base, _bodies) = start_gateway().await;
    let app = TestApp::builder().payments(KEY_ID, KEY_SECRET, &base).build();
    let cookie = app.login_customer(1).await;

    let good = app
        .post(
            "/payments/verify",
            Some(&cookie),
            json!({
                "order_id": "order_Test123",
                "payment_id": "pay_456",
                "signature": sign("order_Test123|pay_456")
            }),
        )
        .await;
    assert_eq!(good.status, StatusCode::OK);
    assert_eq!(good.body, json!({ "verified": true }));

    let tampered = app
        .post(
            "/payments/verify",
            Some(&cookie),
            json!({
                "order_id": "order_Test123",
                "payment_id": "pay_999",
                "signature": sign("order_Test123|pay_456")
            }),
        )
        .await;
    assert_eq!(tampered.status, StatusCode::OK);
    assert_eq!(tampered.body, json!({ "verified": false }));
}
