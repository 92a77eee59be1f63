//! Access decision for a single request.
//!
//! Pure function of path, cookie value and clock; the middleware applies the
//! outcome to the HTTP exchange.

use url::form_urlencoded;

use crate::credential::{Claims, CredentialReader};
use crate::error::CredentialError;
use crate::guard::route::{LOGIN_PATH, RouteClass, RouteTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    /// Let the request reach its destination unchanged
    Continue,
    /// Answer with a redirect to this location
    Redirect(String),
}

/// Why the guard decided what it did; used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    Skipped,
    Infrastructure,
    Public,
    SignedInVisitor,
    MissingCredential,
    InvalidCredential,
    ExpiredCredential,
    Authorized,
    RoleMismatch,
}

impl DecisionReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Infrastructure => "infrastructure",
            Self::Public => "public",
            Self::SignedInVisitor => "signed_in_visitor",
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::ExpiredCredential => "expired_credential",
            Self::Authorized => "authorized",
            Self::RoleMismatch => "role_mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub action: GuardAction,
    /// Delete the credential cookie on the outgoing response
    pub clear_credential: bool,
    pub reason: DecisionReason,
}

impl GuardOutcome {
    const fn pass(reason: DecisionReason) -> Self {
        Self {
            action: GuardAction::Continue,
            clear_credential: false,
            reason,
        }
    }

    const fn redirect(location: String, clear_credential: bool, reason: DecisionReason) -> Self {
        Self {
            action: GuardAction::Redirect(location),
            clear_credential,
            reason,
        }
    }

    pub const fn is_continue(&self) -> bool {
        matches!(self.action, GuardAction::Continue)
    }

    pub fn location(&self) -> Option<&str> {
        match &self.action {
            GuardAction::Redirect(location) => Some(location),
            GuardAction::Continue => None,
        }
    }
}

/// Edge access guard.
///
/// Claims are read without a signature check unless the reader was built
/// with a verifier. Either way this is routing, not authorization: the
/// backend re-authorizes every API call.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    routes: RouteTable,
    reader: CredentialReader,
    cookie_name: String,
}

impl AccessGuard {
    pub fn new(
        routes: RouteTable,
        reader: CredentialReader,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            routes,
            reader,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub const fn reader(&self) -> &CredentialReader {
        &self.reader
    }

    /// Decides what happens to a request for `path`. An empty cookie value
    /// counts as no credential. `now` is epoch seconds.
    pub fn evaluate(&self, path: &str, credential: Option<&str>, now: i64) -> GuardOutcome {
        let credential = credential.filter(|c| !c.is_empty());

        match self.routes.classify(path) {
            RouteClass::Excluded => GuardOutcome::pass(DecisionReason::Skipped),
            RouteClass::Infrastructure => GuardOutcome::pass(DecisionReason::Infrastructure),
            RouteClass::Public => GuardOutcome::pass(DecisionReason::Public),
            RouteClass::AuthPage => self.evaluate_auth_page(credential),
            RouteClass::Protected(_) => self.evaluate_protected(path, credential, now),
        }
    }

    /// Any decodable credential goes to its home; an expired one is then
    /// caught there and sent back with `expired=true`.
    fn evaluate_auth_page(&self, credential: Option<&str>) -> GuardOutcome {
        let Some(raw) = credential else {
            return GuardOutcome::pass(DecisionReason::Public);
        };

        match self.read(raw) {
            Ok(claims) => GuardOutcome::redirect(
                claims.role.home().to_string(),
                false,
                DecisionReason::SignedInVisitor,
            ),
            Err(_) => GuardOutcome::pass(DecisionReason::Public),
        }
    }

    fn evaluate_protected(&self, path: &str, credential: Option<&str>, now: i64) -> GuardOutcome {
        let Some(raw) = credential else {
            return GuardOutcome::redirect(
                login_location(path, false),
                false,
                DecisionReason::MissingCredential,
            );
        };

        let claims = match self.read(raw) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::info!(
                    path = %path,
                    error_code = err.code().as_str(),
                    error = %crate::error::sanitize_message(&err.to_string()),
                    "Rejected unreadable credential"
                );
                return GuardOutcome::redirect(
                    login_location(path, false),
                    true,
                    DecisionReason::InvalidCredential,
                );
            }
        };

        if claims.is_expired_at(now) {
            tracing::info!(path = %path, role = %claims.role, "Rejected expired credential");
            return GuardOutcome::redirect(
                login_location(path, true),
                true,
                DecisionReason::ExpiredCredential,
            );
        }

        if claims.role.owns(path) {
            GuardOutcome::pass(DecisionReason::Authorized)
        } else {
            GuardOutcome::redirect(
                claims.role.home().to_string(),
                false,
                DecisionReason::RoleMismatch,
            )
        }
    }

    fn read(&self, raw: &str) -> Result<Claims, CredentialError> {
        self.reader.read(raw)
    }
}

/// `/login?redirect=<path>[&expired=true]`
pub fn login_location(path: &str, expired: bool) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("redirect", path);
    if expired {
        query.append_pair("expired", "true");
    }
    format!("{LOGIN_PATH}?{}", query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::SignatureVerifier;
    use secrecy::SecretString;
    use test_utils::CredentialFixture;
    use test_utils::fixtures::MALFORMED_CREDENTIALS;

    const NOW: i64 = 1_800_000_000;

    fn guard() -> AccessGuard {
        AccessGuard::new(
            RouteTable::new(["/assets"], ["/api", "/health", "/metrics"]),
            CredentialReader::optimistic(),
            "auth_token",
        )
    }

    fn credential(role: &str, exp: i64) -> String {
        CredentialFixture::for_role(role)
            .with_claim("exp", serde_json::json!(exp))
            .unsigned()
    }

    #[test]
    fn test_missing_credential_redirects_to_login() {
        let outcome = guard().evaluate("/admin/users", None, NOW);
        assert_eq!(outcome.location(), Some("/login?redirect=%2Fadmin%2Fusers"));
        assert!(!outcome.clear_credential);
        assert_eq!(outcome.reason, DecisionReason::MissingCredential);
    }

    #[test]
    fn test_empty_cookie_counts_as_missing() {
        let outcome = guard().evaluate("/doctor", Some(""), NOW);
        assert_eq!(outcome.reason, DecisionReason::MissingCredential);
        assert!(!outcome.clear_credential);
    }

    #[test]
    fn test_malformed_credential_redirects_and_clears() {
        for raw in MALFORMED_CREDENTIALS.iter().filter(|raw| !raw.is_empty()) {
            let outcome = guard().evaluate("/patient/records", Some(raw), NOW);
            assert_eq!(outcome.location(), Some("/login?redirect=%2Fpatient%2Frecords"), "{raw}");
            assert!(outcome.clear_credential, "{raw}");
        }
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let raw = CredentialFixture::for_role("nurse").unsigned();
        let outcome = guard().evaluate("/doctor", Some(&raw), NOW);
        assert_eq!(outcome.reason, DecisionReason::InvalidCredential);
        assert!(outcome.clear_credential);
    }

    #[test]
    fn test_expired_credential_redirects_with_flag() {
        let raw = credential("doctor", NOW - 1);
        let outcome = guard().evaluate("/doctor/schedule", Some(&raw), NOW);
        assert_eq!(
            outcome.location(),
            Some("/login?redirect=%2Fdoctor%2Fschedule&expired=true")
        );
        assert!(outcome.clear_credential);
    }

    #[test]
    fn test_credential_expiring_now_is_still_valid() {
        let raw = credential("doctor", NOW);
        assert!(guard().evaluate("/doctor", Some(&raw), NOW).is_continue());
    }

    #[test]
    fn test_credential_without_exp_never_expires() {
        let raw = CredentialFixture::for_role("admin").without_expiry().unsigned();
        assert!(guard().evaluate("/admin", Some(&raw), i64::MAX).is_continue());
    }

    #[test]
    fn test_role_mismatch_redirects_home_without_clearing() {
        let raw = credential("doctor", NOW + 60);
        let outcome = guard().evaluate("/admin/settings", Some(&raw), NOW);
        assert_eq!(outcome.location(), Some("/doctor"));
        assert!(!outcome.clear_credential);
        assert_eq!(outcome.reason, DecisionReason::RoleMismatch);
    }

    #[test]
    fn test_root_path_redirects_signed_in_user_home() {
        let raw = credential("patient", NOW + 60);
        assert_eq!(guard().evaluate("/", Some(&raw), NOW).location(), Some("/patient"));
    }

    #[test]
    fn test_matching_role_passes_through() {
        let raw = credential("patient", NOW + 60);
        let outcome = guard().evaluate("/patient/appointments/7", Some(&raw), NOW);
        assert_eq!(outcome.action, GuardAction::Continue);
        assert!(!outcome.clear_credential);
    }

    #[test]
    fn test_login_with_valid_credential_redirects_home() {
        let raw = credential("admin", NOW + 60);
        let outcome = guard().evaluate("/login", Some(&raw), NOW);
        assert_eq!(outcome.location(), Some("/admin"));
        assert_eq!(outcome.reason, DecisionReason::SignedInVisitor);
    }

    #[test]
    fn test_login_with_broken_credential_passes() {
        let outcome = guard().evaluate("/login", Some("not-a-token"), NOW);
        assert!(outcome.is_continue());
        assert!(!outcome.clear_credential);
    }

    #[test]
    fn test_register_with_expired_credential_goes_home_then_to_login() {
        let guard = guard();
        let expired = credential("admin", NOW - 60);

        let outcome = guard.evaluate("/register", Some(&expired), NOW);
        assert_eq!(outcome.location(), Some("/admin"));
        assert!(!outcome.clear_credential);

        let outcome = guard.evaluate("/admin", Some(&expired), NOW);
        assert_eq!(outcome.location(), Some("/login?redirect=%2Fadmin&expired=true"));
        assert!(outcome.clear_credential);
    }

    #[test]
    fn test_public_and_infrastructure_ignore_credentials() {
        let guard = guard();
        assert!(guard.evaluate("/forgot-password", Some("not-a-token"), NOW).is_continue());
        assert!(guard.evaluate("/api/doctors", None, NOW).is_continue());
        assert!(guard.evaluate("/assets/app.js", None, NOW).is_continue());
    }

    #[test]
    fn test_verifying_guard_rejects_unsigned_credential() {
        let verifier = SignatureVerifier::hs256(&SecretString::from("edge-secret"));
        let guard = AccessGuard::new(
            RouteTable::new(["/assets"], ["/api"]),
            CredentialReader::verifying(verifier),
            "auth_token",
        );

        let forged = credential("admin", NOW + 60);
        let outcome = guard.evaluate("/admin", Some(&forged), NOW);
        assert_eq!(outcome.reason, DecisionReason::InvalidCredential);

        let signed = CredentialFixture::for_role("admin")
            .with_claim("exp", serde_json::json!(NOW + 60))
            .signed_hs256(b"edge-secret");
        assert!(guard.evaluate("/admin", Some(&signed), NOW).is_continue());
    }

    #[test]
    fn test_login_location_encoding() {
        assert_eq!(login_location("/a b", false), "/login?redirect=%2Fa+b");
    }
}
