//! Shared test utilities for care-portal Rust services.
//!
//! This crate provides:
//! - Proptest generators for roles, portal paths and HTTP values
//! - Credential fixtures (unsigned, signed, expired and malformed)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use fixtures::CredentialFixture;
pub use generators::*;
