//! Sell request inspection.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli sell list
//! bazaar-cli sell list --status approved --limit 20
//! ```

use bazaar_core::SellRequestStatus;
use bazaar_server::db::{PgSellRequestStore, RepositoryError, SellRequestStore};
use bazaar_server::models::{MAX_PAGE_SIZE, SellRequest, SellRequestFilter};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur while listing.
#[derive(Debug, Error)]
pub enum SellError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Print sell requests, oldest first.
pub async fn list(status: Option<&str>, limit: i64) -> Result<(), SellError> {
    let status = status
        .map(|s| {
            s.parse::<SellRequestStatus>()
                .map_err(|_| SellError::InvalidStatus(s.to_owned()))
        })
        .transpose()?;

    let pool = connect().await?;
    let store = PgSellRequestStore::new(pool);
    let filter = SellRequestFilter {
        status,
        limit: limit.clamp(1, MAX_PAGE_SIZE),
        offset: 0,
    };
    let requests = store.list(&filter).await?;

    #[allow(clippy::print_stdout)]
    {
        if requests.is_empty() {
            println!("No sell requests.");
        }
        for request in &requests {
            println!("{}", format_row(request));
        }
    }
    Ok(())
}

/// One line per request: `id  status  qty x item  submitter  created`.
fn format_row(request: &SellRequest) -> String {
    let submitter = request
        .submitter
        .email
        .as_deref()
        .or(request.submitter.name.as_deref())
        .unwrap_or("-");
    format!(
        "{:>6}  {:<9}  {} x {}  {}  {}",
        request.id,
        request.status,
        request.item.quantity,
        request.item.name,
        submitter,
        request.created_at.format("%Y-%m-%d %H:%M"),
    )
}
