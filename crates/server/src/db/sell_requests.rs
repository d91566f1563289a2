//! Sell request persistence.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::sync::RwLock;

use bazaar_core::{SellRequestId, SellRequestStatus};

use super::RepositoryError;
use crate::models::{
    ItemDetails, NewSellRequest, SellRequest, SellRequestFilter, SellRequestPatch, Submitter,
};

/// Storage for sell requests.
#[async_trait]
pub trait SellRequestStore: Send + Sync {
    /// Insert a new request with status `submitted`.
    async fn insert(&self, new: NewSellRequest) -> Result<SellRequest, RepositoryError>;

    /// List requests oldest first, honoring the filter and page.
    async fn list(&self, filter: &SellRequestFilter) -> Result<Vec<SellRequest>, RepositoryError>;

    /// Fetch one request.
    async fn get(&self, id: SellRequestId) -> Result<Option<SellRequest>, RepositoryError>;

    /// Apply a patch atomically.
    ///
    /// Returns `RepositoryError::NotFound` for an unknown ID and
    /// `RepositoryError::InvalidUpdate` if the patch breaks a lifecycle rule.
    /// Nothing is written in either case.
    async fn update(
        &self,
        id: SellRequestId,
        patch: &SellRequestPatch,
    ) -> Result<SellRequest, RepositoryError>;

    /// Delete one request. Returns `true` if it existed.
    async fn delete(&self, id: SellRequestId) -> Result<bool, RepositoryError>;

    /// Cheap connectivity check for the readiness endpoint.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

const COLUMNS: &str = r"
    id, submitter_name, submitter_email, submitter_phone,
    item, quantity, category, condition, description, asking_price,
    status, admin_notes, created_at, updated_at
";

/// Row shape of `sell_request`.
#[derive(Debug, sqlx::FromRow)]
struct SellRequestRow {
    id: SellRequestId,
    submitter_name: Option<String>,
    submitter_email: Option<String>,
    submitter_phone: Option<String>,
    item: String,
    quantity: i32,
    category: Option<String>,
    condition: Option<String>,
    description: Option<String>,
    asking_price: Option<Decimal>,
    status: SellRequestStatus,
    admin_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SellRequestRow> for SellRequest {
    fn from(row: SellRequestRow) -> Self {
        Self {
            id: row.id,
            submitter: Submitter {
                name: row.submitter_name,
                email: row.submitter_email,
                phone: row.submitter_phone,
            },
            item: ItemDetails {
                name: row.item,
                quantity: row.quantity,
                category: row.category,
                condition: row.condition,
                description: row.description,
                asking_price: row.asking_price,
            },
            status: row.status,
            admin_notes: row.admin_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL`-backed sell request store.
#[derive(Clone)]
pub struct PgSellRequestStore {
    pool: PgPool,
}

impl PgSellRequestStore {
    /// Create a new sell request store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SellRequestStore for PgSellRequestStore {
    async fn insert(&self, new: NewSellRequest) -> Result<SellRequest, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO sell_request (
                submitter_name, submitter_email, submitter_phone,
                item, quantity, category, condition, description, asking_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, SellRequestRow>(&sql)
            .bind(new.submitter.name)
            .bind(new.submitter.email)
            .bind(new.submitter.phone)
            .bind(new.item.name)
            .bind(new.item.quantity)
            .bind(new.item.category)
            .bind(new.item.condition)
            .bind(new.item.description)
            .bind(new.item.asking_price)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn list(&self, filter: &SellRequestFilter) -> Result<Vec<SellRequest>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {COLUMNS}
            FROM sell_request
            WHERE ($1::sell_request_status IS NULL OR status = $1)
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
            "
        );
        let rows = sqlx::query_as::<_, SellRequestRow>(&sql)
            .bind(filter.status)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SellRequest::from).collect())
    }

    async fn get(&self, id: SellRequestId) -> Result<Option<SellRequest>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM sell_request WHERE id = $1");
        let row = sqlx::query_as::<_, SellRequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SellRequest::from))
    }

    async fn update(
        &self,
        id: SellRequestId,
        patch: &SellRequestPatch,
    ) -> Result<SellRequest, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM sell_request WHERE id = $1 FOR UPDATE");
        let mut request: SellRequest = sqlx::query_as::<_, SellRequestRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        // Dropping `tx` on this error path rolls back and releases the row lock
        patch
            .apply(&mut request, Utc::now())
            .map_err(RepositoryError::InvalidUpdate)?;

        let update = format!(
            r"
            UPDATE sell_request
            SET item = $2, quantity = $3, category = $4, condition = $5,
                description = $6, asking_price = $7, status = $8,
                admin_notes = $9, updated_at = $10
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, SellRequestRow>(&update)
            .bind(id)
            .bind(&request.item.name)
            .bind(request.item.quantity)
            .bind(&request.item.category)
            .bind(&request.item.condition)
            .bind(&request.item.description)
            .bind(request.item.asking_price)
            .bind(request.status)
            .bind(&request.admin_notes)
            .bind(request.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete(&self, id: SellRequestId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sell_request WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// In-memory
// =============================================================================

#[derive(Default)]
struct MemoryInner {
    last_id: i64,
    records: BTreeMap<SellRequestId, SellRequest>,
}

/// Process-local sell request store.
#[derive(Default)]
pub struct MemorySellRequestStore {
    inner: RwLock<MemoryInner>,
}

impl MemorySellRequestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SellRequestStore for MemorySellRequestStore {
    async fn insert(&self, new: NewSellRequest) -> Result<SellRequest, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = SellRequestId::new(inner.last_id);
        let now = Utc::now();
        let request = SellRequest {
            id,
            submitter: new.submitter,
            item: new.item,
            status: SellRequestStatus::Submitted,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        };
        inner.records.insert(id, request.clone());
        Ok(request)
    }

    async fn list(&self, filter: &SellRequestFilter) -> Result<Vec<SellRequest>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&SellRequest> = inner
            .records
            .values()
            .filter(|r| filter.matches(r))
            .collect();
        matching.sort_by_key(|r| (r.created_at, r.id));

        let offset = usize::try_from(filter.offset).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(0);
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get(&self, id: SellRequestId) -> Result<Option<SellRequest>, RepositoryError> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn update(
        &self,
        id: SellRequestId,
        patch: &SellRequestPatch,
    ) -> Result<SellRequest, RepositoryError> {
        let mut inner = self.inner.write().await;
        let record = inner.records.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        // Work on a copy so a rejected patch leaves the stored record intact
        let mut updated = record.clone();
        patch
            .apply(&mut updated, Utc::now())
            .map_err(RepositoryError::InvalidUpdate)?;
        *record = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: SellRequestId) -> Result<bool, RepositoryError> {
        Ok(self.inner.write().await.records.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
