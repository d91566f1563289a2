//! Request extractors whose rejections are [`AppError`]s.
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text bodies and
//! a mix of 400/415/422. These wrappers turn every decode failure into
//! `AppError::Validation`, so clients always get `400 {"error": ...}`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body extractor.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameter extractor.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string extractor.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(e) => format!("invalid request body: {}", source_text(&e)),
            JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON".to_string(),
            JsonRejection::MissingJsonContentType(_) => {
                "expected Content-Type: application/json".to_string()
            }
            other => other.body_text(),
        };
        Self::Validation(message)
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        let message = match rejection {
            PathRejection::FailedToDeserializePathParams(e) => {
                format!("invalid path parameter: {}", e.body_text())
            }
            other => other.body_text(),
        };
        Self::Validation(message)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(format!("invalid query string: {}", rejection.body_text()))
    }
}

/// The serde message without axum's "Failed to deserialize..." prefix.
fn source_text(err: &axum::extract::rejection::JsonDataError) -> String {
    std::error::Error::source(err).map_or_else(|| err.body_text(), ToString::to_string)
}
