//! Type-State Credential
//!
//! A bearer credential is decoded optimistically: the claims segment is read
//! without checking the signature. A `Credential<Verified>` can only be
//! obtained through [`Credential::verify`], so code that insists on a checked
//! signature says so in its signature.

use std::marker::PhantomData;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};

use crate::credential::claims::Claims;
use crate::error::CredentialError;

/// URL-safe alphabet, padding optional.
const CLAIMS_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ============================================================================
// Sealed Trait Pattern for Trust States
// ============================================================================

mod private {
    /// Sealed trait to prevent external implementations
    pub trait Sealed {}
}

/// Marker trait for credential trust states
pub trait TrustState: private::Sealed {
    /// Human-readable state name for logs
    fn state_name() -> &'static str;
}

/// Claims decoded, signature not checked
#[derive(Debug)]
pub struct Unverified;
impl private::Sealed for Unverified {}
impl TrustState for Unverified {
    fn state_name() -> &'static str {
        "Unverified"
    }
}

/// Signature checked against the configured key
#[derive(Debug)]
pub struct Verified;
impl private::Sealed for Verified {}
impl TrustState for Verified {
    fn state_name() -> &'static str {
        "Verified"
    }
}

// ============================================================================
// Credential
// ============================================================================

/// Decoded bearer credential.
#[derive(Debug)]
pub struct Credential<State: TrustState> {
    raw: String,
    claims: Claims,
    _state: PhantomData<State>,
}

impl Credential<Unverified> {
    /// Splits on `.`, base64url-decodes the middle segment and parses it as
    /// claims. The signature segment is carried along untouched.
    pub fn decode(raw: &str) -> Result<Self, CredentialError> {
        let segments: Vec<&str> = raw.split('.').collect();
        let [_, payload, _] = segments.as_slice() else {
            return Err(CredentialError::Structure {
                segments: segments.len(),
            });
        };

        // Accept either base64 alphabet; some issuers emit the standard one.
        let normalized = payload.replace('+', "-").replace('/', "_");
        let bytes = CLAIMS_ENGINE.decode(normalized)?;
        let claims = serde_json::from_slice::<Claims>(&bytes)?;

        Ok(Self {
            raw: raw.to_string(),
            claims,
            _state: PhantomData,
        })
    }

    /// Checks the signature and transitions to the verified state.
    pub fn verify(
        self,
        verifier: &SignatureVerifier,
    ) -> Result<Credential<Verified>, CredentialError> {
        let data = decode::<Claims>(&self.raw, &verifier.key, &verifier.validation)?;

        Ok(Credential {
            raw: self.raw,
            claims: data.claims,
            _state: PhantomData,
        })
    }
}

// Common methods for all states
impl<S: TrustState> Credential<S> {
    /// Decoded claims. On an unverified credential these are as-delivered.
    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }

    /// Get the current state name
    pub fn state_name(&self) -> &'static str {
        S::state_name()
    }
}

/// HMAC signature check for credentials.
///
/// Expiry is left to the guard so that an expired-but-authentic credential
/// still produces the `expired=true` redirect instead of a generic rejection.
#[derive(Clone)]
pub struct SignatureVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SignatureVerifier {
    pub fn hs256(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
