//! Client for the remote notification service.
//!
//! Notifications are owned by another service; this client only forwards
//! calls on behalf of the signed-in user. Each call is a single round trip.
//! Nothing is retried or cached, and remote failures are returned as-is.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, Response};
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use bazaar_core::UserId;

use crate::config::NotificationConfig;

/// Header identifying the user a call is made for.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Errors from the notification service.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Transport failure (connection refused, DNS, TLS, ...).
    #[error("notification service unreachable: {0}")]
    Http(#[source] reqwest::Error),

    /// The call exceeded the configured timeout.
    #[error("notification service timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("notification service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx with a body that is not JSON.
    #[error("invalid notification response: {0}")]
    Parse(String),

    /// The client could not be built from configuration.
    #[error("invalid notification client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Notification service client.
#[derive(Clone)]
pub struct NotificationClient {
    client: reqwest::Client,
    base_url: Url,
}

impl NotificationClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the service token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &NotificationConfig) -> Result<Self, NotificationError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.service_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| NotificationError::Config(format!("invalid service token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotificationError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// List the user's notifications.
    ///
    /// `params` are forwarded as query parameters untouched (pagination,
    /// `unread=true`, ...). The remote body is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, timeout or non-success status.
    pub async fn get_all(
        &self,
        user: UserId,
        params: &[(String, String)],
    ) -> Result<Value, NotificationError> {
        let mut url = self.endpoint(&["notifications"])?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        self.send(Method::GET, url, user).await
    }

    /// Mark one notification as read.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, timeout or non-success status.
    pub async fn mark_as_read(&self, user: UserId, id: &str) -> Result<Value, NotificationError> {
        let url = self.endpoint(&["notifications", id, "read"])?;
        self.send(Method::PUT, url, user).await
    }

    /// Mark all of the user's notifications as read.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, timeout or non-success status.
    pub async fn mark_all_as_read(&self, user: UserId) -> Result<Value, NotificationError> {
        let url = self.endpoint(&["notifications", "read-all"])?;
        self.send(Method::PUT, url, user).await
    }

    /// Delete one notification.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, timeout or non-success status.
    pub async fn delete(&self, user: UserId, id: &str) -> Result<Value, NotificationError> {
        let url = self.endpoint(&["notifications", id])?;
        self.send(Method::DELETE, url, user).await
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, NotificationError> {
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s))
            .collect::<Vec<_>>()
            .join("/");
        self.base_url
            .join(&path)
            .map_err(|e| NotificationError::Config(format!("invalid endpoint {path}: {e}")))
    }

    async fn send(&self, method: Method, url: Url, user: UserId) -> Result<Value, NotificationError> {
        tracing::debug!(%method, %url, user_id = %user, "Calling notification service");

        let response = self
            .client
            .request(method, url)
            .header(USER_ID_HEADER, user.to_string())
            .send()
            .await?;

        read_body(response).await
    }
}

/// Turn a response into its JSON body; an empty 2xx body becomes `Null`.
async fn read_body(response: Response) -> Result<Value, NotificationError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Err(NotificationError::Api {
            status: status.as_u16(),
            message: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes).map_err(|e| NotificationError::Parse(e.to_string()))
}
