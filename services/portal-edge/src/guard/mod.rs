//! Edge Access Guard
//!
//! Classifies every page request, reads the credential cookie and either lets
//! the request through or redirects: to login when there is no usable
//! credential, to the role's home when the path belongs to another role.

pub mod decision;
pub mod middleware;
pub mod route;

pub use decision::{AccessGuard, DecisionReason, GuardAction, GuardOutcome, login_location};
pub use middleware::access_guard;
pub use route::{AUTH_PAGES, LOGIN_PATH, PUBLIC_PATHS, RouteClass, RouteTable};

use secrecy::ExposeSecret;

use crate::config::Config;
use crate::credential::{CredentialReader, SignatureVerifier};
use crate::server::{HEALTH_PATH, METRICS_PATH};

impl AccessGuard {
    /// Guard for the configured asset prefixes, API prefix and cookie name.
    /// Signatures are verified only when a secret is configured.
    pub fn from_config(config: &Config) -> Self {
        let routes = RouteTable::new(
            config.asset_prefixes.iter().cloned(),
            [config.api_prefix.as_str(), HEALTH_PATH, METRICS_PATH],
        );

        let reader = match &config.jwt_verify_secret {
            Some(secret) if !secret.expose_secret().is_empty() => {
                CredentialReader::verifying(SignatureVerifier::hs256(secret))
            }
            _ => CredentialReader::optimistic(),
        };

        Self::new(routes, reader, config.auth_cookie_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use url::Url;

    fn config() -> Config {
        Config::new(Url::parse("http://localhost:5000/api").unwrap())
    }

    #[test]
    fn test_from_config_defaults_to_optimistic_reader() {
        let guard = AccessGuard::from_config(&config());
        assert!(!guard.reader().verifies_signatures());
        assert_eq!(guard.cookie_name(), "auth_token");
    }

    #[test]
    fn test_from_config_with_secret_verifies() {
        let mut config = config();
        config.jwt_verify_secret = Some(SecretString::from("edge-secret"));
        assert!(AccessGuard::from_config(&config).reader().verifies_signatures());
    }

    #[test]
    fn test_from_config_treats_service_paths_as_infrastructure() {
        let guard = AccessGuard::from_config(&config());
        for path in ["/api/doctors", "/health", "/metrics", "/static/app.css"] {
            assert!(guard.evaluate(path, None, 0).is_continue(), "{path}");
        }
    }
}
