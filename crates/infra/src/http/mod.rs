//! Secure HTTP transport

pub mod channel;

pub use channel::{build_client, SecureChannel};
