//! Integration tests for Bazaar.
//!
//! Tests drive the real router (`bazaar_server::app`) in-process with
//! `tower::ServiceExt::oneshot`, backed by in-memory stores and an in-memory
//! session store. Remote services (notifications, payment gateway) are
//! replaced by small axum stubs bound to `127.0.0.1:0`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! No database or network access beyond loopback is needed.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session};
use url::Url;

use bazaar_core::UserId;
use bazaar_server::config::{
    DEFAULT_RAZORPAY_API_BASE, NotificationConfig, PaymentConfig, ServerConfig,
};
use bazaar_server::db::{MemorySellRequestStore, MemoryWishlistStore};
use bazaar_server::middleware::session::SESSION_COOKIE_NAME;
use bazaar_server::middleware::set_current_user;
use bazaar_server::models::CurrentUser;
use bazaar_server::services::PaymentGateway;
use bazaar_server::state::AppState;

/// A response with its body decoded.
///
/// JSON bodies are parsed; an empty body is `Null`; anything else is kept as
/// a JSON string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Builder for [`TestApp`].
pub struct TestAppBuilder {
    notification_url: Url,
    notification_token: Option<String>,
    notification_timeout: Duration,
    payments: PaymentConfig,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            // Nothing listens on the discard port
            notification_url: Url::parse("http://127.0.0.1:9/").unwrap(),
            notification_token: None,
            notification_timeout: Duration::from_secs(2),
            payments: PaymentConfig {
                key_id: None,
                key_secret: None,
                api_base: Url::parse(&format!("{DEFAULT_RAZORPAY_API_BASE}/")).unwrap(),
                timeout: Duration::from_secs(2),
            },
        }
    }
}

impl TestAppBuilder {
    /// Point the notification client at `base` (e.g. a stub's URL).
    #[must_use]
    pub fn notifications(mut self, base: &str) -> Self {
        self.notification_url = Url::parse(base).unwrap();
        self
    }

    #[must_use]
    pub fn notification_token(mut self, token: &str) -> Self {
        self.notification_token = Some(token.to_string());
        self
    }

    #[must_use]
    pub const fn notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    /// Configure both payment credentials and the gateway base URL.
    #[must_use]
    pub fn payments(mut self, key_id: &str, key_secret: &str, api_base: &str) -> Self {
        self.payments.key_id = Some(key_id.to_string());
        self.payments.key_secret = Some(SecretString::from(key_secret));
        self.payments.api_base = Url::parse(api_base).unwrap();
        self
    }

    pub fn build(self) -> TestApp {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://unused/bazaar_test"),
            host: Ipv4Addr::LOCALHOST.into(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            notifications: NotificationConfig {
                base_url: self.notification_url,
                service_token: self.notification_token.map(SecretString::from),
                timeout: self.notification_timeout,
            },
            payments: self.payments,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let payments = PaymentGateway::from_config(&config.payments);
        let state = AppState::new(
            config,
            Arc::new(MemoryWishlistStore::new()),
            Arc::new(MemorySellRequestStore::new()),
            payments,
        )
        .unwrap();

        let sessions = MemoryStore::default();
        TestApp {
            router: bazaar_server::app(state, sessions.clone()),
            sessions,
            next_client: AtomicU32::new(1),
        }
    }
}

/// The application under test.
pub struct TestApp {
    router: Router,
    sessions: MemoryStore,
    next_client: AtomicU32,
}

impl TestApp {
    /// App with defaults: unreachable notification service, payments disabled.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    /// Sign a user in the way the identity provider does (by writing the
    /// shared session store) and return the `Cookie` header value.
    pub async fn login(&self, user: &CurrentUser) -> String {
        let session = Session::new(None, Arc::new(self.sessions.clone()), None);
        set_current_user(&session, user).await.unwrap();
        session.save().await.unwrap();
        let id = session.id().unwrap();
        format!("{SESSION_COOKIE_NAME}={id}")
    }

    pub async fn login_customer(&self, id: i64) -> String {
        self.login(&CurrentUser::customer(UserId::new(id))).await
    }

    pub async fn login_admin(&self, id: i64) -> String {
        self.login(&CurrentUser::admin(UserId::new(id))).await
    }

    /// Send a request from a fresh client address.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let n = self.next_client.fetch_add(1, Ordering::Relaxed);
        let client_ip = Ipv4Addr::from(0x0A00_0000 | n);
        self.request_from(client_ip.into(), method, uri, cookie, body)
            .await
    }

    /// Send a request as if from `client_ip`.
    pub async fn request_from(
        &self,
        client_ip: std::net::IpAddr,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", client_ip.to_string());
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, cookie, Some(body)).await
    }

    pub async fn put(&self, uri: &str, cookie: Option<&str>, body: Option<Value>) -> TestResponse {
        self.request(Method::PUT, uri, cookie, body).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, cookie, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve `router` on an ephemeral loopback port and return its address.
pub async fn spawn_stub(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    listener.local_addr().unwrap()
}
