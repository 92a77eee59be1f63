//! Portal Edge - access guard and backend API proxy for the care portal.
//!
//! Every page request passes the access guard, which reads the role claim
//! from the `auth_token` cookie and redirects visitors away from namespaces
//! they cannot use. Calls under `/api` are relayed to the origin backend,
//! which remains the authority on every data access.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credential;
pub mod error;
pub mod guard;
pub mod observability;
pub mod proxy;
pub mod server;
pub mod shutdown;

pub use config::Config;
pub use credential::{Claims, CredentialReader, Role};
pub use error::{CredentialError, ErrorCode, ErrorEnvelope, ProxyError};
pub use guard::{AccessGuard, GuardAction, GuardOutcome};
pub use proxy::ProxyClient;
pub use server::{AppState, build_router};
