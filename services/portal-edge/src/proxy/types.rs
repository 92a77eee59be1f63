//! Proxy request and response types.

use std::fmt;

use axum::Json;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

/// Verbs the proxy forwards. Anything else never reaches the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl ProxyMethod {
    pub const ALL: [Self; 5] = [Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete];

    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Self::Get),
            Method::POST => Some(Self::Post),
            Method::PUT => Some(Self::Put),
            Method::PATCH => Some(Self::Patch),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }

    /// Whether an inbound body is read and forwarded. `DELETE` may carry one.
    pub const fn carries_body(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for ProxyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound body as seen by the proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No bytes, or a verb that does not carry a body
    Absent,
    Json(Value),
    /// Bytes that are not JSON; dropped before forwarding
    Invalid(String),
}

impl RequestBody {
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Absent;
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => Self::Json(value),
            Err(e) => Self::Invalid(e.to_string()),
        }
    }

    pub fn for_method(method: ProxyMethod, bytes: &[u8]) -> Self {
        if method.carries_body() {
            Self::parse(bytes)
        } else {
            Self::Absent
        }
    }

    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Absent | Self::Invalid(_) => None,
        }
    }
}

/// A request on its way to the origin.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: ProxyMethod,
    /// Path below the API prefix, percent-encoding preserved
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    pub body: RequestBody,
    /// Inbound `Authorization` value, forwarded verbatim
    pub authorization: Option<HeaderValue>,
}

/// Origin body as relayed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPayload {
    Json(Value),
    Text(String),
}

impl UpstreamPayload {
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}

/// Origin status and body. Always rendered as JSON with the origin's status.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub payload: UpstreamPayload,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.payload.into_value())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_mapping() {
        for method in ProxyMethod::ALL {
            let http = Method::from_bytes(method.as_str().as_bytes()).unwrap();
            assert_eq!(ProxyMethod::from_http(&http), Some(method));
            assert_eq!(method.as_reqwest().as_str(), method.as_str());
        }
        assert_eq!(ProxyMethod::from_http(&Method::HEAD), None);
        assert_eq!(ProxyMethod::from_http(&Method::OPTIONS), None);
    }

    #[test]
    fn test_only_get_is_bodiless() {
        assert!(!ProxyMethod::Get.carries_body());
        assert!(ProxyMethod::Delete.carries_body());
        assert!(ProxyMethod::Patch.carries_body());
    }

    #[test]
    fn test_request_body_parse() {
        assert_eq!(RequestBody::parse(b""), RequestBody::Absent);
        assert_eq!(RequestBody::parse(b"  \n"), RequestBody::Absent);
        assert_eq!(RequestBody::parse(br#"{"a":1}"#), RequestBody::Json(json!({ "a": 1 })));
        assert!(matches!(RequestBody::parse(b"a=1&b=2"), RequestBody::Invalid(_)));
    }

    #[test]
    fn test_get_body_is_ignored() {
        let body = RequestBody::for_method(ProxyMethod::Get, br#"{"a":1}"#);
        assert_eq!(body, RequestBody::Absent);
        assert!(body.as_json().is_none());
    }

    #[test]
    fn test_text_payload_becomes_json_string() {
        let value = UpstreamPayload::Text("OK".to_string()).into_value();
        assert_eq!(value, json!("OK"));
    }

    #[test]
    fn test_upstream_response_keeps_status() {
        let response = UpstreamResponse {
            status: StatusCode::UNAUTHORIZED,
            payload: UpstreamPayload::Json(json!({ "success": false })),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["content-type"], "application/json");
    }
}
