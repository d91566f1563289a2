//! Sell request route handlers.
//!
//! `POST /sell` is public (and rate limited); the rest require an admin.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use bazaar_core::SellRequestId;

use crate::error::Result;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::RequireAdmin;
use crate::models::{CreateSellRequest, SellRequest, SellRequestQuery, UpdateSellRequest};
use crate::state::AppState;

/// POST /sell
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSellRequest>,
) -> Result<(StatusCode, Json<SellRequest>)> {
    let created = state.sell_requests().create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /sell?status=&limit=&offset=
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppQuery(query): AppQuery<SellRequestQuery>,
) -> Result<Json<Vec<SellRequest>>> {
    Ok(Json(state.sell_requests().list(query).await?))
}

/// GET /sell/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, sell_request_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<SellRequestId>,
) -> Result<Json<SellRequest>> {
    Ok(Json(state.sell_requests().get(id).await?))
}

/// PUT /sell/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, sell_request_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<SellRequestId>,
    AppJson(payload): AppJson<UpdateSellRequest>,
) -> Result<Json<SellRequest>> {
    Ok(Json(state.sell_requests().update(id, payload).await?))
}

/// DELETE /sell/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, sell_request_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<SellRequestId>,
) -> Result<StatusCode> {
    state.sell_requests().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
