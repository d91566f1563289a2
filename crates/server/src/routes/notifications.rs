//! Notification route handlers.
//!
//! Thin pass-through to the remote notification service on behalf of the
//! signed-in user. Remote bodies come back verbatim; an empty remote body
//! becomes `204 No Content`.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::extract::{AppPath, AppQuery};
use crate::middleware::RequireAuth;
use crate::state::AppState;

fn passthrough(body: Value) -> Response {
    if body.is_null() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(body).into_response()
    }
}

/// GET /notifications
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppQuery(params): AppQuery<Vec<(String, String)>>,
) -> Result<Response> {
    let body = state.notifications().get_all(user.id, &params).await?;
    Ok(passthrough(body))
}

/// PUT /notifications/{id}/read
#[instrument(skip_all, fields(user_id = %user.id, notification_id = %id))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<String>,
) -> Result<Response> {
    let body = state.notifications().mark_as_read(user.id, &id).await?;
    Ok(passthrough(body))
}

/// PUT /notifications/read-all
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let body = state.notifications().mark_all_as_read(user.id).await?;
    Ok(passthrough(body))
}

/// DELETE /notifications/{id}
#[instrument(skip_all, fields(user_id = %user.id, notification_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<String>,
) -> Result<Response> {
    let body = state.notifications().delete(user.id, &id).await?;
    Ok(passthrough(body))
}
