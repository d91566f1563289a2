//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BAZAAR_BASE_URL` - Public URL of the API
//! - `NOTIFICATION_SERVICE_URL` - Base URL of the remote notification service
//!
//! ## Optional
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 3000)
//! - `NOTIFICATION_SERVICE_TOKEN` - Bearer token presented to the notification service
//! - `NOTIFICATION_TIMEOUT_SECS` - Per-call timeout (default: 10)
//! - `RAZORPAY_KEY_ID` / `RAZORPAY_KEY_SECRET` - Payment credentials. If either
//!   is missing, payments are disabled for the lifetime of the process.
//! - `RAZORPAY_API_BASE` - Gateway base URL (default: <https://api.razorpay.com/v1>)
//! - `PAYMENT_TIMEOUT_SECS` - Per-call timeout (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default base URL of the Razorpay REST API.
pub const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Environment variable holding the payment key ID.
pub const PAYMENT_KEY_ID_VAR: &str = "RAZORPAY_KEY_ID";

/// Environment variable holding the payment key secret.
pub const PAYMENT_KEY_SECRET_VAR: &str = "RAZORPAY_KEY_SECRET";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API
    pub base_url: String,
    /// Remote notification service
    pub notifications: NotificationConfig,
    /// Payment gateway credentials and endpoint
    pub payments: PaymentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Remote notification service configuration.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Base URL; operation paths are appended to it.
    pub base_url: Url,
    /// Service token sent as `Authorization: Bearer ...`.
    pub service_token: Option<SecretString>,
    /// Bound on each round trip.
    pub timeout: Duration,
}

/// Payment gateway configuration.
///
/// Both credentials are optional here on purpose: their absence is a
/// degraded mode, not a startup failure. See [`crate::services::payments`].
#[derive(Clone)]
pub struct PaymentConfig {
    /// Public key ID (also handed to the browser checkout).
    pub key_id: Option<String>,
    /// Key secret used for API auth and signature verification.
    pub key_secret: Option<SecretString>,
    /// Gateway REST base URL.
    pub api_base: Url,
    /// Bound on each round trip.
    pub timeout: Duration,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("key_id", &self.key_id.as_deref().map(mask_key_id))
            .field("key_secret", &self.key_secret.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    /// Missing payment credentials are *not* an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BAZAAR_DATABASE_URL")?;
        let host = parse_env("BAZAAR_HOST", "127.0.0.1")?;
        let port = parse_env("BAZAAR_PORT", "3000")?;
        let base_url = get_required_env("BAZAAR_BASE_URL")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            notifications: NotificationConfig::from_env()?,
            payments: PaymentConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl NotificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("NOTIFICATION_SERVICE_URL", &get_required_env("NOTIFICATION_SERVICE_URL")?)?,
            service_token: get_optional_env("NOTIFICATION_SERVICE_TOKEN").map(SecretString::from),
            timeout: Duration::from_secs(parse_env("NOTIFICATION_TIMEOUT_SECS", "10")?),
        })
    }
}

impl PaymentConfig {
    /// Load only the payment section.
    ///
    /// Exposed separately so operator tooling can inspect payment readiness
    /// without a database or notification service configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the API base or timeout is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            key_id: get_optional_env(PAYMENT_KEY_ID_VAR),
            key_secret: get_optional_env(PAYMENT_KEY_SECRET_VAR).map(SecretString::from),
            api_base: parse_url(
                "RAZORPAY_API_BASE",
                &get_env_or_default("RAZORPAY_API_BASE", DEFAULT_RAZORPAY_API_BASE),
            )?,
            timeout: Duration::from_secs(parse_env("PAYMENT_TIMEOUT_SECS", "15")?),
        })
    }

    /// Names of the credential variables that are not set.
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.key_id.is_none() {
            missing.push(PAYMENT_KEY_ID_VAR);
        }
        if self.key_secret.is_none() {
            missing.push(PAYMENT_KEY_SECRET_VAR);
        }
        missing
    }
}

/// Mask a key ID for logs: keep the mode prefix and the last four characters.
///
/// `rzp_live_AbCdEfGh1234` becomes `rzp_live_****1234`.
#[must_use]
pub fn mask_key_id(key_id: &str) -> String {
    let (prefix, rest) = key_id
        .rfind('_')
        .map_or(("", key_id), |pos| key_id.split_at(pos + 1));
    let tail: String = rest
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if rest.chars().count() <= 4 {
        return format!("{prefix}****");
    }
    format!("{prefix}****{tail}")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a base URL, normalizing it to end with `/` so relative joins append.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
