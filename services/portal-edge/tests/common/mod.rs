//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, Response, header};
use portal_edge::{AppState, Config, build_router};
use secrecy::SecretString;
use tower::ServiceExt;
use url::Url;

pub const COOKIE: &str = "auth_token";

pub fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/public")
}

/// Config pointing the proxy at `origin` (e.g. a `MockServer` URI).
pub fn config_for(origin: &str) -> Config {
    let mut config = Config::new(Url::parse(&format!("{origin}/api")).unwrap());
    config.static_dir = static_dir();
    config
}

pub fn app_for(origin: &str) -> Router {
    build_router(AppState::from_config(config_for(origin)).unwrap())
}

/// App whose origin is never reached.
pub fn app() -> Router {
    app_for("http://127.0.0.1:1")
}

pub fn verifying_app(secret: &str) -> Router {
    let mut config = config_for("http://127.0.0.1:1");
    config.jwt_verify_secret = Some(SecretString::from(secret));
    build_router(AppState::from_config(config).unwrap())
}

pub async fn get(app: Router, path: &str, credential: Option<&str>) -> Response<Body> {
    let mut request = Request::get(path);
    if let Some(credential) = credential {
        request = request.header(header::COOKIE, format!("{COOKIE}={credential}"));
    }
    app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// True when the response deletes the credential cookie.
pub fn clears_credential(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| {
            v.starts_with(&format!("{COOKIE}=;")) && v.contains("Max-Age=0") && v.contains("Path=/")
        })
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
