//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{PgSellRequestStore, PgWishlistStore, SellRequestStore, WishlistStore};
use crate::services::notifications::{NotificationClient, NotificationError};
use crate::services::payments::PaymentGateway;
use crate::services::{SellRequestService, WishlistService};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("notification client: {0}")]
    Notification(#[from] NotificationError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Stores are injected, so the
/// same router runs against `PostgreSQL` in production and in-memory stores
/// in tests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    wishlist: WishlistService,
    sell_requests: SellRequestService,
    notifications: NotificationClient,
    payments: PaymentGateway,
}

impl AppState {
    /// Create a new application state from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification client cannot be built.
    pub fn new(
        config: ServerConfig,
        wishlist: Arc<dyn WishlistStore>,
        sell_requests: Arc<dyn SellRequestStore>,
        payments: PaymentGateway,
    ) -> Result<Self, StateError> {
        let notifications = NotificationClient::new(&config.notifications)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                wishlist: WishlistService::new(wishlist),
                sell_requests: SellRequestService::new(sell_requests),
                notifications,
                payments,
            }),
        })
    }

    /// Create the production state: `PostgreSQL` stores and a payment
    /// gateway resolved from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification client cannot be built.
    pub fn from_pool(config: ServerConfig, pool: &PgPool) -> Result<Self, StateError> {
        let payments = PaymentGateway::from_config(&config.payments);
        Self::new(
            config,
            Arc::new(PgWishlistStore::new(pool.clone())),
            Arc::new(PgSellRequestStore::new(pool.clone())),
            payments,
        )
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Wishlist operations.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistService {
        &self.inner.wishlist
    }

    /// Sell request registry.
    #[must_use]
    pub fn sell_requests(&self) -> &SellRequestService {
        &self.inner.sell_requests
    }

    /// Remote notification service client.
    #[must_use]
    pub fn notifications(&self) -> &NotificationClient {
        &self.inner.notifications
    }

    /// Payment gateway handle (ready or disabled).
    #[must_use]
    pub fn payments(&self) -> &PaymentGateway {
        &self.inner.payments
    }
}
