//! Persistence for wishlists and sell requests.
//!
//! # Stores
//!
//! Each aggregate has a store trait with two implementations:
//!
//! - `Pg*Store` - `PostgreSQL`, used by the server binary
//! - `Memory*Store` - process-local, used by tests and fixtures
//!
//! Handlers never see either concretely; `AppState` holds `Arc<dyn ...>`.
//!
//! # Tables
//!
//! - `wishlist_entry` - `(user_id, product_id)` favorites
//! - `sell_request` - seller submissions and their review status
//! - `tower_sessions.session` - session storage (owned by `tower-sessions`)
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```

pub mod sell_requests;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use sell_requests::{MemorySellRequestStore, PgSellRequestStore, SellRequestStore};
pub use wishlist::{MemoryWishlistStore, PgWishlistStore, WishlistStore};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// The requested change breaks a domain rule; nothing was written.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
