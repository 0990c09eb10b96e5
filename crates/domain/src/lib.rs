//! # BankPartner Domain
//!
//! Data types shared by every layer of the partner banking SDK.
//!
//! This crate contains:
//! - Session configuration and environment selection
//! - The SDK error taxonomy and the server error payload
//! - Token, page and certificate models
//! - Scope identifiers, endpoint paths and defaults
//!
//! ## Architecture
//! - No dependencies on other BankPartner crates
//! - No I/O: pure models and validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
