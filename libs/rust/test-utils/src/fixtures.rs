//! Credential fixtures.
//!
//! Builds bearer credentials in the three-segment `header.claims.signature`
//! shape the portal backend issues.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Map, Value, json};

/// Signature segment used on unsigned fixtures.
pub const FAKE_SIGNATURE: &str = "c2lnbmF0dXJl";

/// Builder for test credentials.
#[derive(Debug, Clone)]
pub struct CredentialFixture {
    claims: Map<String, Value>,
}

impl CredentialFixture {
    /// Credential for `role` expiring one hour from now.
    #[must_use]
    pub fn for_role(role: &str) -> Self {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!("user-123"));
        claims.insert("role".to_string(), json!(role));
        claims.insert("iat".to_string(), json!(Utc::now().timestamp()));
        claims.insert("exp".to_string(), json!(Utc::now().timestamp() + 3600));
        Self { claims }
    }

    /// Credential for `role` that expired an hour ago.
    #[must_use]
    pub fn expired(role: &str) -> Self {
        Self::for_role(role).expires_in(-3600)
    }

    /// Moves the `exp` claim to `now + offset_secs`.
    #[must_use]
    pub fn expires_in(mut self, offset_secs: i64) -> Self {
        self.claims
            .insert("exp".to_string(), json!(Utc::now().timestamp() + offset_secs));
        self
    }

    /// Drops the `exp` claim entirely.
    #[must_use]
    pub fn without_expiry(mut self) -> Self {
        self.claims.remove("exp");
        self
    }

    /// Sets an arbitrary claim.
    #[must_use]
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Raw claims object.
    #[must_use]
    pub fn claims(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Encodes with a placeholder signature that no key verifies.
    #[must_use]
    pub fn unsigned(&self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.claims().to_string());
        format!("{header}.{payload}.{FAKE_SIGNATURE}")
    }

    /// Encodes and signs with HS256.
    ///
    /// # Panics
    ///
    /// Panics if the claims cannot be serialized, which only happens for
    /// fixtures built with non-JSON values.
    #[must_use]
    pub fn signed_hs256(&self, secret: &[u8]) -> String {
        #[allow(clippy::expect_used)]
        encode(
            &Header::default(),
            &self.claims(),
            &EncodingKey::from_secret(secret),
        )
        .expect("fixture claims always serialize")
    }
}

/// Credentials that must never decode.
pub const MALFORMED_CREDENTIALS: &[&str] = &[
    "not-a-token",
    "",
    "only.two",
    "a.b.c.d",
    "header.%%%.signature",
    "header.bm90LWpzb24.signature",
];
