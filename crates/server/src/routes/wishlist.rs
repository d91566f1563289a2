//! Wishlist route handlers.
//!
//! All routes require a signed-in user and only ever touch that user's own
//! wishlist.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::ProductId;

use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Body of `POST /wishlist/add` and `POST /wishlist/toggle`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemRequest {
    #[serde(alias = "product_id")]
    pub product_id: Option<String>,
}

impl WishlistItemRequest {
    fn product(self) -> Result<ProductId> {
        let raw = self
            .product_id
            .ok_or_else(|| AppError::Validation("productId is required".to_string()))?;
        Ok(ProductId::parse(&raw)?)
    }
}

/// The user's wishlist.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub product_ids: Vec<ProductId>,
}

/// Result of a toggle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub product_id: ProductId,
    pub in_wishlist: bool,
}

/// GET /wishlist
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<WishlistResponse>> {
    let product_ids = state.wishlist().get(user.id).await?;
    Ok(Json(WishlistResponse { product_ids }))
}

/// POST /wishlist/add
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<WishlistItemRequest>,
) -> Result<Json<WishlistResponse>> {
    let product = body.product()?;
    let product_ids = state.wishlist().add(user.id, &product).await?;
    Ok(Json(WishlistResponse { product_ids }))
}

/// POST /wishlist/toggle
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<WishlistItemRequest>,
) -> Result<Json<ToggleResponse>> {
    let product = body.product()?;
    let in_wishlist = state.wishlist().toggle(user.id, &product).await?;
    Ok(Json(ToggleResponse {
        product_id: product,
        in_wishlist,
    }))
}

/// DELETE /wishlist/{productId}
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<String>,
) -> Result<Json<WishlistResponse>> {
    let product = ProductId::parse(&product_id)?;
    let product_ids = state.wishlist().remove(user.id, &product).await?;
    Ok(Json(WishlistResponse { product_ids }))
}
