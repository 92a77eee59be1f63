//! Centralized HTTP client configuration and building.
//!
//! This module provides a standardized way to create HTTP clients with
//! consistent configuration across all care-portal services.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::error::PlatformError;

/// HTTP client configuration.
///
/// No request or connect timeout is applied: a call waits for the peer for
/// as long as the caller's own request lifecycle allows.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Pool idle timeout (default: 90s)
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host (default: 10)
    pub pool_max_idle_per_host: usize,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: "care-portal-rust/1.0".to_string(),
        }
    }
}

impl HttpConfig {
    /// Sets a custom user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Build a configured HTTP client.
///
/// Creates a reqwest client with rustls TLS, connection pooling, and
/// the specified configuration.
///
/// # Errors
///
/// Returns [`PlatformError::Http`] if the client cannot be built
/// (e.g., TLS initialization fails).
///
/// # Examples
///
/// ```
/// use rust_common::{HttpConfig, build_http_client};
///
/// let config = HttpConfig::default().with_user_agent("portal-edge/0.1");
/// let client = build_http_client(&config).expect("Failed to build client");
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, PlatformError> {
    let client = ClientBuilder::new()
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()?;

    Ok(client)
}
