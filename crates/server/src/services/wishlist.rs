//! Wishlist operations for signed-in users.

use std::sync::Arc;

use bazaar_core::{ProductId, UserId};

use crate::db::WishlistStore;
use crate::error::Result;

/// Get/add/toggle/remove over a [`WishlistStore`].
///
/// Add and remove are idempotent; toggle is its own inverse.
#[derive(Clone)]
pub struct WishlistService {
    store: Arc<dyn WishlistStore>,
}

impl WishlistService {
    #[must_use]
    pub fn new(store: Arc<dyn WishlistStore>) -> Self {
        Self { store }
    }

    /// The user's product IDs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn get(&self, user: UserId) -> Result<Vec<ProductId>> {
        Ok(self.store.list(user).await?)
    }

    /// Add a product; re-adding is a no-op. Returns the updated wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn add(&self, user: UserId, product: &ProductId) -> Result<Vec<ProductId>> {
        if self.store.insert(user, product).await? {
            tracing::info!(user_id = %user, product_id = %product, "Added to wishlist");
        }
        self.get(user).await
    }

    /// Flip membership. Returns `true` if the product is now in the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn toggle(&self, user: UserId, product: &ProductId) -> Result<bool> {
        let in_wishlist = self.store.toggle(user, product).await?;
        tracing::info!(
            user_id = %user,
            product_id = %product,
            in_wishlist,
            "Toggled wishlist entry"
        );
        Ok(in_wishlist)
    }

    /// Remove a product; removing an absent one succeeds. Returns the updated
    /// wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store fails.
    pub async fn remove(&self, user: UserId, product: &ProductId) -> Result<Vec<ProductId>> {
        if self.store.remove(user, product).await? {
            tracing::info!(user_id = %user, product_id = %product, "Removed from wishlist");
        }
        self.get(user).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryWishlistStore;

    fn service() -> WishlistService {
        WishlistService::new(Arc::new(MemoryWishlistStore::new()))
    }

    fn p(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_membership() {
        let service = service();
        let user = UserId::new(1);
        service.add(user, &p("P2")).await.unwrap();

        for product in [p("P1"), p("P2")] {
            let before = service.get(user).await.unwrap();
            service.toggle(user, &product).await.unwrap();
            service.toggle(user, &product).await.unwrap();
            let mut after = service.get(user).await.unwrap();
            let mut before = before;
            before.sort();
            after.sort();
            assert_eq!(before, after);
        }
    }

    #[tokio::test]
    async fn test_toggle_reports_new_state() {
        let service = service();
        let user = UserId::new(1);

        assert!(service.toggle(user, &p("P1")).await.unwrap());
        assert!(!service.toggle(user, &p("P1")).await.unwrap());
        assert!(!service.get(user).await.unwrap().contains(&p("P1")));
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let service = service();
        let user = UserId::new(1);

        let once = service.add(user, &p("P1")).await.unwrap();
        let twice = service.add(user, &p("P1")).await.unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice, vec![p("P1")]);
    }

    #[tokio::test]
    async fn test_remove_absent_is_ok() {
        let service = service();
        let user = UserId::new(1);
        service.add(user, &p("P1")).await.unwrap();

        let after = service.remove(user, &p("P404")).await.unwrap();
        assert_eq!(after, vec![p("P1")]);
    }
}
