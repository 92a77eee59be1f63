//! Backend Proxy
//!
//! Relays `/api/*` calls to the origin backend: same verb, path and query,
//! JSON body and `Authorization` header carried over, origin status and body
//! relayed back as JSON.

pub mod client;
pub mod handler;
pub mod types;

pub use client::ProxyClient;
pub use handler::proxy_handler;
pub use types::{ProxyMethod, ProxyRequest, RequestBody, UpstreamPayload, UpstreamResponse};
