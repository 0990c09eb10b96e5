//! # BankPartner Infrastructure
//!
//! I/O side of the partner banking SDK.
//!
//! This crate contains:
//! - Certificate bundle inspection (OpenSSL)
//! - The mutual-TLS secure channel (reqwest + native-tls)
//! - OAuth2 client-credentials tokens cached per scope
//! - The request executor, URL builder and webhook helper
//! - Configuration loading and the [`Session`] tying it all together
//!
//! ## Architecture
//! - Implements traits defined in `bankpartner-core`
//! - Depends on `bankpartner-domain` and `bankpartner-core`
//! - Contains all "impure" code (network, file system)

pub mod api;
pub mod auth;
pub mod certificate;
pub mod config;
pub mod errors;
pub mod http;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used items
pub use api::{ApiUrl, RequestExecutor, WebhookHelper};
pub use auth::TokenProvider;
pub use http::SecureChannel;
pub use session::Session;
