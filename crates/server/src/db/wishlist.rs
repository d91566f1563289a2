//! Wishlist persistence.
//!
//! Every mutation keeps `(user_id, product_id)` unique. `insert` and `remove`
//! are single statements guarded by the primary key; `toggle` reads then
//! writes, so it alone is serialized per pair (advisory lock in `PostgreSQL`,
//! the write lock in memory).

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use bazaar_core::{ProductId, UserId};

use super::RepositoryError;

/// Storage for per-user wishlists.
#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Product IDs for a user, oldest first.
    async fn list(&self, user: UserId) -> Result<Vec<ProductId>, RepositoryError>;

    /// Add a pair. Returns `true` if it was not already present.
    async fn insert(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError>;

    /// Remove a pair. Returns `true` if it was present.
    async fn remove(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError>;

    /// Flip membership. Returns the membership after the flip.
    async fn toggle(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// `PostgreSQL`-backed wishlist store.
#[derive(Clone)]
pub struct PgWishlistStore {
    pool: PgPool,
}

impl PgWishlistStore {
    /// Create a new wishlist store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Advisory lock key for one `(user, product)` pair.
fn lock_key(user: UserId, product: &ProductId) -> String {
    format!("wishlist:{user}:{product}")
}

/// Re-validate a `product_id` column value.
fn stored_product_id(raw: &str) -> Result<ProductId, RepositoryError> {
    ProductId::parse(raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid product id in database: {e}"))
    })
}

#[async_trait]
impl WishlistStore for PgWishlistStore {
    async fn list(&self, user: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let rows = sqlx::query_scalar::<_, String>(
            r"
            SELECT product_id
            FROM wishlist_entry
            WHERE user_id = $1
            ORDER BY created_at, product_id
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|raw| stored_product_id(raw)).collect()
    }

    async fn insert(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO wishlist_entry (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user)
        .bind(product)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM wishlist_entry
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user)
        .bind(product)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn toggle(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Released on commit/rollback
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(lock_key(user, product))
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query(
            r"
            DELETE FROM wishlist_entry
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user)
        .bind(product)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let now_present = if removed == 0 {
            sqlx::query(
                r"
                INSERT INTO wishlist_entry (user_id, product_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, product_id) DO NOTHING
                ",
            )
            .bind(user)
            .bind(product)
            .execute(&mut *tx)
            .await?;
            true
        } else {
            false
        };

        tx.commit().await?;
        Ok(now_present)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local wishlist store.
///
/// Entries keep insertion order, matching the `created_at` ordering of the
/// `PostgreSQL` store.
#[derive(Default)]
pub struct MemoryWishlistStore {
    entries: RwLock<HashMap<UserId, Vec<ProductId>>>,
}

impl MemoryWishlistStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WishlistStore for MemoryWishlistStore {
    async fn list(&self, user: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        Ok(self
            .entries
            .read()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let mut entries = self.entries.write().await;
        let products = entries.entry(user).or_default();
        if products.contains(product) {
            return Ok(false);
        }
        products.push(product.clone());
        Ok(true)
    }

    async fn remove(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let mut entries = self.entries.write().await;
        let Some(products) = entries.get_mut(&user) else {
            return Ok(false);
        };
        let before = products.len();
        products.retain(|p| p != product);
        let removed = products.len() != before;
        if products.is_empty() {
            entries.remove(&user);
        }
        Ok(removed)
    }

    async fn toggle(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let mut entries = self.entries.write().await;
        let products = entries.entry(user).or_default();
        if let Some(pos) = products.iter().position(|p| p == product) {
            products.remove(pos);
            if products.is_empty() {
                entries.remove(&user);
            }
            Ok(false)
        } else {
            products.push(product.clone());
            Ok(true)
        }
    }
}
