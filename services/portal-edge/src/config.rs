//! Type-Safe Configuration with Validation
//!
//! Loads the edge configuration from environment variables (optionally
//! seeded from a `.env` file) and validates it before the server starts.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BACKEND_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_API_PREFIX: &str = "/api";
const DEFAULT_AUTH_COOKIE: &str = "auth_token";
const DEFAULT_STATIC_DIR: &str = "./public";
const DEFAULT_ASSET_PREFIXES: &[&str] = &["/assets", "/static"];
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SHUTDOWN_TIMEOUT: u64 = 30;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: String, reason: String },

    /// Invalid port number
    #[error("Invalid port: must be between 1 and 65535")]
    InvalidPort,

    /// Path prefix is not absolute or is the root itself
    #[error("Invalid path prefix for {field}: {value}")]
    InvalidPrefix { field: String, value: String },

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError { name: String, reason: String },
}

/// Edge service configuration.
#[derive(Debug)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port (1-65535)
    pub port: u16,
    /// Origin the proxy forwards to
    pub backend_api_url: Url,
    /// Namespace the proxy is mounted under
    pub api_prefix: String,
    /// Cookie carrying the bearer credential
    pub auth_cookie_name: String,
    /// Directory holding the compiled front-end bundle
    pub static_dir: PathBuf,
    /// Build-asset namespaces the guard never evaluates
    pub asset_prefixes: Vec<String>,
    /// HMAC secret; when present the guard verifies credential signatures
    pub jwt_verify_secret: Option<SecretString>,
    /// Default log filter
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

impl Config {
    /// Default configuration pointing the proxy at `backend_api_url`.
    #[must_use]
    pub fn new(backend_api_url: Url) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend_api_url,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            auth_cookie_name: DEFAULT_AUTH_COOKIE.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            asset_prefixes: DEFAULT_ASSET_PREFIXES.iter().map(ToString::to_string).collect(),
            jwt_verify_secret: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            shutdown_timeout_seconds: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Loads configuration from environment variables with validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let asset_prefixes = parse_list_env("ASSET_PREFIXES");
        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_env("PORT", DEFAULT_PORT)?,
            backend_api_url: parse_url_env("BACKEND_API_URL", DEFAULT_BACKEND_API_URL)?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string()),
            auth_cookie_name: env::var("AUTH_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_AUTH_COOKIE.to_string()),
            static_dir: env::var("STATIC_DIR")
                .map_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from),
            asset_prefixes: if asset_prefixes.is_empty() {
                DEFAULT_ASSET_PREFIXES.iter().map(ToString::to_string).collect()
            } else {
                asset_prefixes
            },
            jwt_verify_secret: env::var("JWT_VERIFY_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .map(SecretString::from),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            log_json: parse_env("LOG_JSON", false)?,
            shutdown_timeout_seconds: parse_env("SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if !matches!(self.backend_api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                field: "BACKEND_API_URL".to_string(),
                reason: format!("unsupported scheme {}", self.backend_api_url.scheme()),
            });
        }
        check_prefix("API_PREFIX", &self.api_prefix)?;
        for prefix in &self.asset_prefixes {
            check_prefix("ASSET_PREFIXES", prefix)?;
        }
        if self.auth_cookie_name.is_empty() {
            return Err(ConfigError::MissingRequired("auth_cookie_name".to_string()));
        }
        if self.shutdown_timeout_seconds == 0 {
            return Err(ConfigError::ParseError {
                name: "SHUTDOWN_TIMEOUT".to_string(),
                reason: "timeout must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Graceful shutdown timeout.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

fn check_prefix(field: &str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') || value == "/" || value.ends_with('/') {
        return Err(ConfigError::InvalidPrefix {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Parse an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a URL environment variable with a default value.
fn parse_url_env(name: &str, default: &str) -> Result<Url, ConfigError> {
    let url_str = env::var(name).unwrap_or_else(|_| default.to_string());
    Url::parse(&url_str).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a comma-separated list environment variable.
fn parse_list_env(name: &str) -> Vec<String> {
    env::var(name)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
