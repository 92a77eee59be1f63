//! Request correlation.
//!
//! Every request carries an `x-request-id`: the caller's when supplied,
//! otherwise a fresh UUID. The id is recorded on the request span and echoed
//! on the response.

use axum::http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the correlation id
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Generates a UUID v4 correlation id for requests that arrive without one
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeCorrelationId;

impl MakeRequestId for MakeCorrelationId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Span for one HTTP exchange, keyed by correlation id
pub fn request_span<B>(request: &Request<B>) -> Span {
    let correlation_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        service = "portal-edge",
        correlation_id = %correlation_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_make_correlation_id_is_uuid() {
        let request = Request::new(Body::empty());
        let id = MakeCorrelationId.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }

    #[test]
    fn test_ids_are_unique() {
        let request = Request::new(Body::empty());
        let a = MakeCorrelationId.make_request_id(&request).unwrap();
        let b = MakeCorrelationId.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
