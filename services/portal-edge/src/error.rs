//! Error handling module
//!
//! - `CredentialError`: why a bearer credential was rejected at the edge.
//!   The guard never surfaces these to the caller; they only steer the
//!   redirect decision and the logs.
//! - `ProxyError`: why a forward to the origin failed. Always rendered as
//!   the uniform `{ success: false, message }` envelope with status 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback message when an error renders to an empty string.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Sensitive patterns that should be sanitized from logged messages
const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "secret",
    "token",
    "bearer",
    "authorization",
    "cookie",
    "api_key",
    "apikey",
];

/// Reasons a credential cannot be used for a routing decision.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Not three dot-separated segments
    #[error("Credential malformed: expected 3 segments, found {segments}")]
    Structure {
        /// Number of segments found
        segments: usize,
    },

    /// Claims segment is not valid base64url
    #[error("Credential claims segment is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Claims segment does not hold the expected claims
    #[error("Credential claims unreadable: {0}")]
    Claims(#[from] serde_json::Error),

    /// Signature check failed (only when edge verification is enabled)
    #[error("Credential signature rejected: {0}")]
    Signature(#[from] jsonwebtoken::errors::Error),
}

/// Error codes used in structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    CredentialMalformed,
    CredentialClaimsInvalid,
    CredentialSignatureInvalid,
    UpstreamUnreachable,
    UpstreamInvalidResponse,
    ProxyInternal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CredentialMalformed => "EDGE_CREDENTIAL_MALFORMED",
            Self::CredentialClaimsInvalid => "EDGE_CREDENTIAL_CLAIMS_INVALID",
            Self::CredentialSignatureInvalid => "EDGE_CREDENTIAL_SIGNATURE_INVALID",
            Self::UpstreamUnreachable => "PROXY_UPSTREAM_UNREACHABLE",
            Self::UpstreamInvalidResponse => "PROXY_UPSTREAM_INVALID_RESPONSE",
            Self::ProxyInternal => "PROXY_INTERNAL_ERROR",
        }
    }
}

impl CredentialError {
    /// Get the error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Structure { .. } | Self::Encoding(_) => ErrorCode::CredentialMalformed,
            Self::Claims(_) => ErrorCode::CredentialClaimsInvalid,
            Self::Signature(_) => ErrorCode::CredentialSignatureInvalid,
        }
    }
}

/// Failures while forwarding a request to the origin.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Target URL could not be built from origin, path and query
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport failure: connect, send, or body read
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Origin declared JSON but sent something else
    #[error("Upstream returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ProxyError {
    /// Get the error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::UpstreamUnreachable,
            Self::InvalidJson(_) => ErrorCode::UpstreamInvalidResponse,
            Self::InvalidUrl(_) => ErrorCode::ProxyInternal,
        }
    }

    /// The uniform failure envelope for this error.
    #[must_use]
    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::failure(self.to_string())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self.envelope())).into_response()
    }
}

/// `{ "success": false, "message": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `false`
    pub success: bool,
    /// Error text, or [`INTERNAL_SERVER_ERROR`] when there is none
    pub message: String,
}

impl ErrorEnvelope {
    /// Builds a failure envelope, substituting the generic message for blanks.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: if message.trim().is_empty() {
                INTERNAL_SERVER_ERROR.to_string()
            } else {
                message
            },
        }
    }
}

/// Sanitize a message by removing sensitive information
#[must_use]
pub fn sanitize_message(message: &str) -> String {
    if contains_sensitive_info(message) {
        return "[redacted]".to_string();
    }
    message.to_string()
}

/// Check if a string contains sensitive information
#[must_use]
pub fn contains_sensitive_info(text: &str) -> bool {
    let lower = text.to_lowercase();
    SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p))
}
