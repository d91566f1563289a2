//! Sell request registry.
//!
//! Creation is public; everything else is for admins. Authorization happens
//! in the route extractors, not here.

use std::sync::Arc;

use bazaar_core::SellRequestId;

use crate::db::{RepositoryError, SellRequestStore};
use crate::error::{AppError, Result};
use crate::models::{CreateSellRequest, SellRequest, SellRequestQuery, UpdateSellRequest};

/// Validates payloads and maps store errors for the HTTP layer.
#[derive(Clone)]
pub struct SellRequestService {
    store: Arc<dyn SellRequestStore>,
}

impl SellRequestService {
    #[must_use]
    pub fn new(store: Arc<dyn SellRequestStore>) -> Self {
        Self { store }
    }

    /// Record a new submission with status `submitted`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if required fields are missing or
    /// invalid; no record is created in that case.
    pub async fn create(&self, payload: CreateSellRequest) -> Result<SellRequest> {
        let new = payload.into_new()?;
        let created = self.store.insert(new).await?;
        tracing::info!(
            sell_request_id = %created.id,
            item = %created.item.name,
            quantity = created.item.quantity,
            "Sell request submitted"
        );
        Ok(created)
    }

    /// List requests oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a malformed query.
    pub async fn list(&self, query: SellRequestQuery) -> Result<Vec<SellRequest>> {
        let filter = query.into_filter()?;
        Ok(self.store.list(&filter).await?)
    }

    /// Fetch one request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no request has this ID.
    pub async fn get(&self, id: SellRequestId) -> Result<SellRequest> {
        self.store.get(id).await?.ok_or_else(|| not_found(id))
    }

    /// Apply an admin patch.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown ID and
    /// `AppError::Validation` for invalid values or a disallowed status
    /// change. Nothing is written on error.
    pub async fn update(&self, id: SellRequestId, payload: UpdateSellRequest) -> Result<SellRequest> {
        let patch = payload.into_patch()?;
        let updated = self.store.update(id, &patch).await.map_err(|e| match e {
            RepositoryError::NotFound => not_found(id),
            RepositoryError::InvalidUpdate(msg) => AppError::Validation(msg),
            other => AppError::Database(other),
        })?;
        tracing::info!(
            sell_request_id = %id,
            status = %updated.status,
            "Sell request updated"
        );
        Ok(updated)
    }

    /// Delete a request permanently.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no request has this ID.
    pub async fn delete(&self, id: SellRequestId) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(sell_request_id = %id, "Sell request deleted");
        Ok(())
    }

    /// Whether the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store cannot be reached.
    pub async fn ping(&self) -> Result<()> {
        Ok(self.store.ping().await?)
    }
}

fn not_found(id: SellRequestId) -> AppError {
    AppError::NotFound(format!("sell request {id} not found"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::SellRequestStatus;

    use super::*;
    use crate::db::MemorySellRequestStore;

    fn service() -> SellRequestService {
        SellRequestService::new(Arc::new(MemorySellRequestStore::new()))
    }

    fn bottle() -> CreateSellRequest {
        CreateSellRequest {
            item: Some("bottle".to_string()),
            qty: Some(5),
            ..Default::default()
        }
    }

    fn set_status(status: &str) -> UpdateSellRequest {
        UpdateSellRequest {
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_list_approve() {
        let service = service();

        let created = service.create(bottle()).await.unwrap();
        assert_eq!(created.status, SellRequestStatus::Submitted);

        let all = service.list(SellRequestQuery::default()).await.unwrap();
        assert!(all.iter().any(|r| r.id == created.id));

        service.update(created.id, set_status("approved")).await.unwrap();
        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.status, SellRequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_missing_fields_create_nothing() {
        let service = service();
        let err = service
            .create(CreateSellRequest {
                qty: None,
                ..bottle()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(service.list(SellRequestQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let service = service();
        let id = SellRequestId::new(77);

        assert!(matches!(service.get(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.update(id, set_status("approved")).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.delete(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_transition_is_validation_error() {
        let service = service();
        let created = service.create(bottle()).await.unwrap();
        service.update(created.id, set_status("rejected")).await.unwrap();

        let err = service
            .update(created.id, set_status("approved"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            service.get(created.id).await.unwrap().status,
            SellRequestStatus::Rejected
        );
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let service = service();
        let created = service.create(bottle()).await.unwrap();

        service.delete(created.id).await.unwrap();
        assert!(matches!(service.get(created.id).await, Err(AppError::NotFound(_))));
    }
}
