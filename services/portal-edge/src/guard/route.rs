//! Path classification for the access guard.

use crate::credential::{Role, path_has_prefix};

/// Pages reachable without a credential.
pub const PUBLIC_PATHS: &[&str] = &["/login", "/register", "/forgot-password", "/reset-password"];

/// Public pages that bounce an already signed-in visitor to their home.
pub const AUTH_PAGES: &[&str] = &["/login", "/register"];

pub const LOGIN_PATH: &str = "/login";

const FAVICON_PATH: &str = "/favicon.ico";

const IMAGE_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Skipped by the matcher: build assets, favicon, images
    Excluded,
    /// API namespace and service endpoints
    Infrastructure,
    /// Login or register
    AuthPage,
    /// Password reset and similar pages
    Public,
    /// Everything else; carries the role namespace the path falls in
    Protected(Option<Role>),
}

/// Prefix tables the guard classifies against.
#[derive(Debug, Clone)]
pub struct RouteTable {
    asset_prefixes: Vec<String>,
    infrastructure: Vec<String>,
}

impl RouteTable {
    pub fn new(
        asset_prefixes: impl IntoIterator<Item = impl Into<String>>,
        infrastructure: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            asset_prefixes: asset_prefixes.into_iter().map(Into::into).collect(),
            infrastructure: infrastructure.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_excluded(path) {
            RouteClass::Excluded
        } else if self.infrastructure.iter().any(|p| path_has_prefix(path, p)) {
            RouteClass::Infrastructure
        } else if AUTH_PAGES.iter().any(|p| path_has_prefix(path, p)) {
            RouteClass::AuthPage
        } else if PUBLIC_PATHS.iter().any(|p| path_has_prefix(path, p)) {
            RouteClass::Public
        } else {
            RouteClass::Protected(Role::for_path(path))
        }
    }

    fn is_excluded(&self, path: &str) -> bool {
        path == FAVICON_PATH
            || self.asset_prefixes.iter().any(|p| path_has_prefix(path, p))
            || has_image_extension(path)
    }
}

fn has_image_extension(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty() && IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new(["/assets", "/static"], ["/api", "/health", "/metrics"])
    }

    #[test]
    fn test_assets_and_images_are_excluded() {
        let table = table();
        assert_eq!(table.classify("/assets/app.js"), RouteClass::Excluded);
        assert_eq!(table.classify("/static/css/main.css"), RouteClass::Excluded);
        assert_eq!(table.classify("/favicon.ico"), RouteClass::Excluded);
        assert_eq!(table.classify("/doctor/avatar.PNG"), RouteClass::Excluded);
        assert_eq!(table.classify("/logo.webp"), RouteClass::Excluded);
    }

    #[test]
    fn test_non_image_extension_is_not_excluded() {
        assert_eq!(
            table().classify("/admin/report.pdf"),
            RouteClass::Protected(Some(Role::Admin))
        );
    }

    #[test]
    fn test_infrastructure() {
        let table = table();
        assert_eq!(table.classify("/api/doctors"), RouteClass::Infrastructure);
        assert_eq!(table.classify("/health"), RouteClass::Infrastructure);
        assert_eq!(table.classify("/apis"), RouteClass::Protected(None));
    }

    #[test]
    fn test_public_and_auth_pages() {
        let table = table();
        assert_eq!(table.classify("/login"), RouteClass::AuthPage);
        assert_eq!(table.classify("/register"), RouteClass::AuthPage);
        assert_eq!(table.classify("/forgot-password"), RouteClass::Public);
        assert_eq!(table.classify("/reset-password/abc123"), RouteClass::Public);
        assert_eq!(table.classify("/login-help"), RouteClass::Protected(None));
    }

    #[test]
    fn test_protected_namespaces() {
        let table = table();
        assert_eq!(table.classify("/admin"), RouteClass::Protected(Some(Role::Admin)));
        assert_eq!(
            table.classify("/patient/appointments"),
            RouteClass::Protected(Some(Role::Patient))
        );
        assert_eq!(table.classify("/"), RouteClass::Protected(None));
    }
}
