//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Bodies are JSON: `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use validator::ValidationErrors;

use bazaar_core::ProductIdError;

use crate::db::RepositoryError;
use crate::services::notifications::NotificationError;
use crate::services::payments::PaymentError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is signed in but lacks the role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Notification service call failed.
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Payment operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("{field} is invalid"), ToString::to_string)
                })
            })
            .collect();
        messages.sort();
        messages.dedup();

        if messages.is_empty() {
            return Self::Validation("invalid request".to_string());
        }
        Self::Validation(messages.join("; "))
    }
}

impl From<ProductIdError> for AppError {
    fn from(err: ProductIdError) -> Self {
        Self::Validation(format!("productId {err}"))
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Notification(err) => match err {
                NotificationError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                NotificationError::Api { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                NotificationError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                NotificationError::Http(_) | NotificationError::Parse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Payment(err) => match err {
                PaymentError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                PaymentError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                PaymentError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                PaymentError::Http(_) | PaymentError::Api { .. } | PaymentError::Parse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
        }
    }

    /// Whether this is our fault (or our dependency's) and worth reporting.
    const fn is_reportable(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Notification(err) => !matches!(err, NotificationError::Api { .. }),
            Self::Payment(err) => !matches!(
                err,
                PaymentError::Unavailable(_) | PaymentError::InvalidAmount(_)
            ),
            _ => false,
        }
    }

    /// Response body. Internal details never leave the process.
    fn body(&self) -> Value {
        match self {
            Self::Database(_) | Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg) => json!({ "error": msg }),
            Self::Notification(err) => match err {
                // Remote rejections pass through as the service sent them
                NotificationError::Api { message, .. } => serde_json::from_str(message)
                    .unwrap_or_else(|_| json!({ "error": message })),
                NotificationError::Timeout => {
                    json!({ "error": "Notification service timed out" })
                }
                _ => json!({ "error": "Notification service error" }),
            },
            Self::Payment(err) => match err {
                PaymentError::Unavailable(_) => json!({ "error": "payment unavailable" }),
                PaymentError::InvalidAmount(e) => json!({ "error": format!("amount {e}") }),
                PaymentError::Timeout => json!({ "error": "Payment gateway timed out" }),
                _ => json!({ "error": "Payment gateway error" }),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_reportable() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if let Self::Payment(PaymentError::Unavailable(reason)) = &self {
            tracing::debug!(%reason, "Payment attempted while disabled");
        }

        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the current scope.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use validator::Validate;

    use super::*;
    use crate::services::payments::DisabledReason;

    #[derive(Validate)]
    struct SignupForm {
        #[validate(length(min = 3, message = "name is too short"))]
        name: String,
        #[validate(range(min = 1))]
        qty: i32,
    }

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("sell request 9".to_string());
        assert_eq!(err.to_string(), "Not found: sell request 9");

        let err = AppError::Validation("qty is required".to_string());
        assert_eq!(err.to_string(), "Validation error: qty is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Notification(NotificationError::Timeout).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::Notification(NotificationError::Api {
                status: 404,
                message: String::new()
            })
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Payment(PaymentError::Unavailable(DisabledReason::MissingCredentials(
                vec![]
            )))
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_validation_errors_are_joined_in_order() {
        let errors = SignupForm {
            name: "ab".to_string(),
            qty: 0,
        }
        .validate()
        .unwrap_err();

        let AppError::Validation(message) = AppError::from(errors) else {
            panic!("expected validation error");
        };
        assert_eq!(message, "name is too short; qty is invalid");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) = body_of(AppError::Internal("pool exhausted".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_corrupt_row_is_internal_error() {
        let err = AppError::from(RepositoryError::DataCorruption(
            "invalid product id in database: product id contains invalid character '/'"
                .to_string(),
        ));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_remote_rejection_passes_through() {
        let err = AppError::Notification(NotificationError::Api {
            status: 409,
            message: r#"{"error":"already read"}"#.to_string(),
        });
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "error": "already read" }));
    }

    #[tokio::test]
    async fn test_payment_unavailable_body() {
        let err = AppError::Payment(PaymentError::Unavailable(
            DisabledReason::MissingCredentials(vec!["RAZORPAY_KEY_ID"]),
        ));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "error": "payment unavailable" }));
    }
}
