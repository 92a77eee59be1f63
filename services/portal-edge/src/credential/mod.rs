//! Bearer credential decoding.

pub mod claims;
pub mod token;

pub use claims::{Claims, Role, path_has_prefix};
pub use token::{Credential, SignatureVerifier, TrustState, Unverified, Verified};

use crate::error::CredentialError;

/// Turns a raw cookie value into claims, verifying the signature only when
/// a verifier is configured.
#[derive(Debug, Clone, Default)]
pub struct CredentialReader {
    verifier: Option<SignatureVerifier>,
}

impl CredentialReader {
    /// Optimistic reader: claims are trusted as delivered.
    pub const fn optimistic() -> Self {
        Self { verifier: None }
    }

    pub fn verifying(verifier: SignatureVerifier) -> Self {
        Self {
            verifier: Some(verifier),
        }
    }

    pub const fn verifies_signatures(&self) -> bool {
        self.verifier.is_some()
    }

    pub fn read(&self, raw: &str) -> Result<Claims, CredentialError> {
        let credential = Credential::decode(raw)?;
        let claims = match &self.verifier {
            Some(verifier) => traced(credential.verify(verifier)?),
            None => traced(credential),
        };
        Ok(claims)
    }
}

fn traced<S: TrustState>(credential: Credential<S>) -> Claims {
    tracing::debug!(
        state = credential.state_name(),
        role = %credential.claims().role,
        "Credential read"
    );
    credential.into_claims()
}
