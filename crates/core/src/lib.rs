//! # BankPartner Core
//!
//! Transport-independent logic of the partner banking SDK.
//!
//! This crate contains:
//! - The page aggregation algorithm used by every listing endpoint
//! - Port interfaces (traits) implemented by the infrastructure layer
//! - The clock abstraction used for token expiry and certificate checks
//!
//! ## Architecture Principles
//! - Only depends on `bankpartner-domain`
//! - No HTTP, TLS or file system code
//! - All external dependencies via traits

pub mod pagination;
pub mod ports;
pub mod time;

pub use pagination::{collect_all, collect_source};
pub use ports::{AccessTokenProvider, PageSource};
pub use time::{Clock, MockClock, SystemClock};
