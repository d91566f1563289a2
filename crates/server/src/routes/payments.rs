//! Payment route handlers.
//!
//! Every operation resolves the gateway first, so a disabled gateway answers
//! `503 payment unavailable` before any input is looked at.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use bazaar_core::{CurrencyCode, Price};

use crate::error::Result;
use crate::extract::AppJson;
use crate::middleware::RequireAuth;
use crate::services::GatewayOrder;
use crate::state::AppState;

/// Public checkout configuration.
#[derive(Debug, Serialize)]
pub struct PaymentConfigResponse {
    pub enabled: bool,
    /// Public key for the browser checkout; `null` when disabled.
    pub key_id: Option<String>,
}

/// Body of `POST /payments/orders`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    /// Amount in major units, e.g. `"499.50"`.
    pub amount: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[validate(length(min = 1, max = 40, message = "receipt must be 1-40 characters"))]
    pub receipt: Option<String>,
}

/// Body of `POST /payments/verify`.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, max = 64, message = "order_id is required"))]
    pub order_id: String,
    #[validate(length(min = 1, max = 64, message = "payment_id is required"))]
    pub payment_id: String,
    #[validate(length(min = 1, max = 128, message = "signature is required"))]
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub verified: bool,
}

/// GET /payments/config
pub async fn config(State(state): State<AppState>) -> Json<PaymentConfigResponse> {
    let gateway = state.payments();
    Json(PaymentConfigResponse {
        enabled: gateway.is_ready(),
        key_id: gateway.key_id().map(String::from),
    })
}

/// POST /payments/orders
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<GatewayOrder>)> {
    let client = state.payments().client()?;
    body.validate()?;

    let price = Price::new(body.amount, body.currency);
    let order = client.create_order(&price, body.receipt.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// POST /payments/verify
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn verify(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>> {
    let client = state.payments().client()?;
    body.validate()?;

    let verified = client.verify_signature(&body.order_id, &body.payment_id, &body.signature);
    if verified {
        tracing::info!(order_id = %body.order_id, payment_id = %body.payment_id, "Payment verified");
    } else {
        tracing::warn!(order_id = %body.order_id, "Payment signature mismatch");
    }
    Ok(Json(VerifyPaymentResponse { verified }))
}
