//! CLI subcommands.

pub mod migrate;
pub mod payments;
pub mod sell;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

/// Errors opening the database.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Neither `BAZAAR_DATABASE_URL` nor `DATABASE_URL` is set.
    #[error("Missing environment variable: BAZAAR_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// Connection failed.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the Bazaar database named by the environment.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = ["BAZAAR_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .map(SecretString::from)
        .ok_or(ConnectError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}
