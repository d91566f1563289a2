//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (database ping)
//!
//! # Sell requests
//! POST   /sell                      - Submit (public, rate limited)
//! GET    /sell                      - List (admin)
//! GET    /sell/{id}                 - Show (admin)
//! PUT    /sell/{id}                 - Update (admin)
//! DELETE /sell/{id}                 - Delete (admin)
//!
//! # Wishlist (requires auth)
//! GET    /wishlist                  - Current user's wishlist
//! POST   /wishlist/add              - Add a product
//! POST   /wishlist/toggle           - Toggle a product
//! DELETE /wishlist/{productId}      - Remove a product
//!
//! # Notifications (requires auth, proxied)
//! GET    /notifications             - List
//! PUT    /notifications/{id}/read   - Mark one read
//! PUT    /notifications/read-all    - Mark all read
//! DELETE /notifications/{id}        - Delete one
//!
//! # Payments
//! GET    /payments/config           - Checkout config (public)
//! POST   /payments/orders           - Create gateway order (requires auth)
//! POST   /payments/verify           - Verify checkout signature (requires auth)
//! ```

pub mod notifications;
pub mod payments;
pub mod sell;
pub mod wishlist;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::middleware::sell_rate_limiter;
use crate::state::AppState;

/// Create the sell request routes router.
pub fn sell_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(sell::list).merge(post(sell::create).layer(sell_rate_limiter())),
        )
        .route(
            "/{id}",
            get(sell::show).put(sell::update).delete(sell::delete),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/toggle", post(wishlist::toggle))
        .route("/{product_id}", delete(wishlist::remove))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::index))
        .route("/read-all", put(notifications::mark_all_read))
        .route("/{id}", delete(notifications::delete))
        .route("/{id}/read", put(notifications::mark_read))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/config", get(payments::config))
        .route("/orders", post(payments::create_order))
        .route("/verify", post(payments::verify))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/sell", sell_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/notifications", notification_routes())
        .nest("/payments", payment_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.sell_requests().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
