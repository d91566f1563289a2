//! Payment gateway (Razorpay) client and its startup state.
//!
//! The gateway is resolved once at boot into a [`PaymentGateway`]:
//!
//! - `Ready` - both credentials were present and a client was built
//! - `Disabled` - at least one credential was missing
//!
//! `Disabled` is terminal for the lifetime of the process. Callers go through
//! [`PaymentGateway::client`], which fails fast with
//! [`PaymentError::Unavailable`] instead of attempting a call.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use url::Url;

use bazaar_core::{Price, PriceError};

use crate::config::{PaymentConfig, mask_key_id};

type HmacSha256 = Hmac<Sha256>;

/// Errors from payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payments are disabled for this process.
    #[error("payment unavailable: {0}")]
    Unavailable(DisabledReason),

    /// The amount cannot be charged.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] PriceError),

    /// Transport failure.
    #[error("payment gateway unreachable: {0}")]
    Http(#[source] reqwest::Error),

    /// The call exceeded the configured timeout.
    #[error("payment gateway timed out")]
    Timeout,

    /// The gateway answered with a non-success status.
    #[error("payment gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The gateway answered 2xx with an unexpected body.
    #[error("invalid payment gateway response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Why payments are disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisabledReason {
    /// These credential variables were not set.
    MissingCredentials(Vec<&'static str>),
    /// Credentials were present but the HTTP client could not be built.
    Client(String),
}

impl std::fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials(vars) => {
                write!(f, "missing credentials: {}", vars.join(", "))
            }
            Self::Client(err) => write!(f, "client error: {err}"),
        }
    }
}

/// Payment gateway handle, resolved once at startup.
#[derive(Clone)]
pub enum PaymentGateway {
    Ready(PaymentClient),
    Disabled(DisabledReason),
}

impl PaymentGateway {
    /// Resolve the gateway from configuration.
    ///
    /// Never fails: missing credentials log a warning naming the absent
    /// variables and yield `Disabled`.
    #[must_use]
    pub fn from_config(config: &PaymentConfig) -> Self {
        let (Some(key_id), Some(key_secret)) = (&config.key_id, &config.key_secret) else {
            let missing = config.missing_credentials();
            tracing::warn!(
                missing = %missing.join(", "),
                "Payment credentials not configured, payments disabled"
            );
            return Self::Disabled(DisabledReason::MissingCredentials(missing));
        };

        match PaymentClient::new(key_id.clone(), key_secret.clone(), config) {
            Ok(client) => {
                tracing::info!(
                    key_id = %mask_key_id(key_id),
                    api_base = %config.api_base,
                    "Payment client ready"
                );
                Self::Ready(client)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build payment client, payments disabled");
                Self::Disabled(DisabledReason::Client(e.to_string()))
            }
        }
    }

    /// The client, or `PaymentError::Unavailable` when disabled.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Unavailable` if payments are disabled.
    pub fn client(&self) -> Result<&PaymentClient, PaymentError> {
        match self {
            Self::Ready(client) => Ok(client),
            Self::Disabled(reason) => Err(PaymentError::Unavailable(reason.clone())),
        }
    }

    /// Whether payments can be taken.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Public key ID for browser checkout, if ready.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        match self {
            Self::Ready(client) => Some(client.key_id()),
            Self::Disabled(_) => None,
        }
    }
}

impl std::fmt::Debug for PaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(client) => f
                .debug_tuple("Ready")
                .field(&mask_key_id(client.key_id()))
                .finish(),
            Self::Disabled(reason) => f.debug_tuple("Disabled").field(reason).finish(),
        }
    }
}

/// An order created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order ID (`order_...`).
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<&'a str>,
}

/// Authenticated Razorpay REST client.
#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    api_base: Url,
    key_id: String,
    key_secret: SecretString,
}

impl PaymentClient {
    fn new(
        key_id: String,
        key_secret: SecretString,
        config: &PaymentConfig,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            key_id,
            key_secret,
        })
    }

    /// Public key ID.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a gateway order for `price`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` for a zero, negative or
    /// over-precise amount without contacting the gateway. Otherwise returns
    /// the transport, timeout or API error of the call.
    pub async fn create_order(
        &self,
        price: &Price,
        receipt: Option<&str>,
    ) -> Result<GatewayOrder, PaymentError> {
        let body = CreateOrderBody {
            amount: price.to_chargeable_minor_units()?,
            currency: price.currency_code.as_str(),
            receipt,
        };
        let url = self
            .api_base
            .join("orders")
            .map_err(|e| PaymentError::Parse(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // A body that cannot be read is a transport failure, not an API error
            let message = response.text().await?;
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let order: GatewayOrder = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))?;

        tracing::info!(order_id = %order.id, amount = order.amount, "Payment order created");
        Ok(order)
    }

    /// Check a checkout signature.
    ///
    /// The gateway signs `"{order_id}|{payment_id}"` with HMAC-SHA256 keyed by
    /// the key secret and sends it hex-encoded. Comparison is constant time.
    #[must_use]
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(self.key_secret.expose_secret().as_bytes())
        else {
            return false;
        };
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;
    use std::time::Duration;

    use bazaar_core::CurrencyCode;
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::{DEFAULT_RAZORPAY_API_BASE, PAYMENT_KEY_ID_VAR, PAYMENT_KEY_SECRET_VAR};

    fn config(key_id: Option<&str>, key_secret: Option<&str>) -> PaymentConfig {
        PaymentConfig {
            key_id: key_id.map(String::from),
            key_secret: key_secret.map(SecretString::from),
            api_base: Url::parse(&format!("{DEFAULT_RAZORPAY_API_BASE}/")).unwrap(),
            timeout: Duration::from_secs(5),
        }
    }

    fn sign(secret: &str, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_missing_both_credentials_disables() {
        let gateway = PaymentGateway::from_config(&config(None, None));

        assert!(!gateway.is_ready());
        assert_eq!(gateway.key_id(), None);
        let err = gateway.client().err().unwrap();
        assert!(matches!(
            err,
            PaymentError::Unavailable(DisabledReason::MissingCredentials(ref vars))
                if vars == &[PAYMENT_KEY_ID_VAR, PAYMENT_KEY_SECRET_VAR]
        ));
        assert!(err.to_string().starts_with("payment unavailable"));
    }

    #[test]
    fn test_missing_one_credential_disables() {
        let gateway = PaymentGateway::from_config(&config(Some("rzp_test_abc123456"), None));
        assert!(matches!(
            gateway,
            PaymentGateway::Disabled(DisabledReason::MissingCredentials(ref vars))
                if vars == &[PAYMENT_KEY_SECRET_VAR]
        ));
    }

    #[test]
    fn test_both_credentials_ready() {
        let gateway = PaymentGateway::from_config(&config(Some("rzp_test_abc123456"), Some("secret")));
        assert!(gateway.is_ready());
        assert_eq!(gateway.key_id(), Some("rzp_test_abc123456"));
    }

    #[test]
    fn test_debug_masks_key_id() {
        let gateway = PaymentGateway::from_config(&config(Some("rzp_live_AbCdEfGh1234"), Some("secret")));
        let debug_output = format!("{gateway:?}");
        assert!(debug_output.contains("rzp_live_****1234"));
        assert!(!debug_output.contains("AbCdEfGh"));
        assert!(!debug_output.contains("secret"));
    }

    #[test]
    fn test_verify_signature() {
        let gateway = PaymentGateway::from_config(&config(Some("rzp_test_abc123456"), Some("s3cr3t")));
        let client = gateway.client().unwrap();
        let signature = sign("s3cr3t", "order_123|pay_456");

        assert!(client.verify_signature("order_123", "pay_456", &signature));
        assert!(!client.verify_signature("order_123", "pay_789", &signature));
        assert!(!client.verify_signature("order_123", "pay_456", &sign("other", "order_123|pay_456")));
        assert!(!client.verify_signature("order_123", "pay_456", "not-hex"));
    }

    #[tokio::test]
    async fn test_zero_amount_rejected_before_network() {
        let gateway = PaymentGateway::from_config(&config(Some("rzp_test_abc123456"), Some("s3cr3t")));
        let price = Price::new(Decimal::from_str("0").unwrap(), CurrencyCode::INR);

        let err = gateway.client().unwrap().create_order(&price, None).await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(PriceError::Zero)));
    }

    #[tokio::test]
    async fn test_truncated_error_body_is_http_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.ends_with(b"}") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend(buf.iter().take(n));
            }
            // Promises 64 bytes, sends 9, then hangs up
            socket
                .write_all(
                    b"HTTP/1.1 400 Bad Request\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{\"error\":",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let mut cfg = config(Some("rzp_test_abc123456"), Some("s3cr3t"));
        cfg.api_base = Url::parse(&format!("http://{addr}/v1/")).unwrap();
        let gateway = PaymentGateway::from_config(&cfg);
        let price = Price::new(Decimal::from_str("10.00").unwrap(), CurrencyCode::INR);

        let err = gateway.client().unwrap().create_order(&price, None).await.unwrap_err();
        assert!(matches!(err, PaymentError::Http(_)), "{err:?}");
    }
}
