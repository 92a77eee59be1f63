//! `/api/{*path}` handler.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ALLOW, AUTHORIZATION};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::sanitize_message;
use crate::proxy::types::{ProxyMethod, ProxyRequest, RequestBody};
use crate::server::AppState;

/// Forwards the call to the origin and relays its status and body. Every
/// failure becomes the 500 envelope; nothing escapes as a panic or a
/// framework error page.
pub async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // `get` also routes HEAD; only the five proxied verbs are accepted.
    let Some(method) = ProxyMethod::from_http(&method) else {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(ALLOW, "GET,POST,PUT,PATCH,DELETE")],
        )
            .into_response();
    };

    let request = build_request(&state.config.api_prefix, method, &uri, &headers, &body);
    if let RequestBody::Invalid(reason) = &request.body {
        tracing::debug!(
            method = %method,
            path = %request.path,
            reason = %reason,
            "Dropping non-JSON request body"
        );
    }

    let started = Instant::now();
    let result = state.proxy.forward(&request).await;
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(upstream) => {
            state
                .metrics
                .record_proxy(method.as_str(), upstream.status.as_u16(), elapsed);
            tracing::debug!(
                method = %method,
                path = %request.path,
                status = upstream.status.as_u16(),
                "Relayed origin response"
            );
            upstream.into_response()
        }
        Err(err) => {
            state.metrics.record_proxy(
                method.as_str(),
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                elapsed,
            );
            tracing::error!(
                method = %method,
                path = %request.path,
                error_code = err.code().as_str(),
                error = %sanitize_message(&err.to_string()),
                "Proxy request failed"
            );
            err.into_response()
        }
    }
}

/// Path below `api_prefix` taken from the raw URI, so percent-encoding
/// reaches the origin untouched.
fn build_request(
    api_prefix: &str,
    method: ProxyMethod,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> ProxyRequest {
    let path = uri.path();
    let path = path.strip_prefix(api_prefix).unwrap_or(path);

    ProxyRequest {
        method,
        path: path.trim_start_matches('/').to_string(),
        query: uri.query().map(ToString::to_string),
        body: RequestBody::for_method(method, body),
        authorization: headers.get(AUTHORIZATION).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_build_request_strips_prefix_and_keeps_query() {
        let uri: Uri = "/api/doctors?specialization=cardiology".parse().unwrap();
        let request = build_request("/api", ProxyMethod::Get, &uri, &HeaderMap::new(), b"");

        assert_eq!(request.path, "doctors");
        assert_eq!(request.query.as_deref(), Some("specialization=cardiology"));
        assert_eq!(request.body, RequestBody::Absent);
        assert!(request.authorization.is_none());
    }

    #[test]
    fn test_build_request_copies_authorization_and_body() {
        let uri: Uri = "/api/appointments/12".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));

        let request = build_request(
            "/api",
            ProxyMethod::Patch,
            &uri,
            &headers,
            br#"{"status":"confirmed"}"#,
        );

        assert_eq!(request.path, "appointments/12");
        assert_eq!(request.authorization, Some(HeaderValue::from_static("Bearer abc")));
        assert_eq!(request.body, RequestBody::Json(json!({ "status": "confirmed" })));
    }

    #[test]
    fn test_build_request_keeps_encoded_segments() {
        let uri: Uri = "/api/search/a%2Fb".parse().unwrap();
        let request = build_request("/api", ProxyMethod::Get, &uri, &HeaderMap::new(), b"");
        assert_eq!(request.path, "search/a%2Fb");
    }

    #[test]
    fn test_build_request_keeps_opaque_authorization_bytes() {
        let uri: Uri = "/api/profile".parse().unwrap();
        let raw = HeaderValue::from_bytes(b"Bearer caf\xc3\xa9").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, raw.clone());

        let request = build_request("/api", ProxyMethod::Get, &uri, &headers, b"");
        assert_eq!(request.authorization, Some(raw));
    }
}
