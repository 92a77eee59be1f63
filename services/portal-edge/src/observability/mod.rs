//! Observability Module
//!
//! Prometheus metrics and request correlation. Subscriber setup lives in
//! `rust_common::tracing_config`.

pub mod correlation;
pub mod metrics;

pub use correlation::{MakeCorrelationId, REQUEST_ID_HEADER, request_span};
pub use metrics::EdgeMetrics;
