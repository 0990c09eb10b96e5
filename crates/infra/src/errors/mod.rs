//! Error conversion helpers for the infrastructure layer

pub mod conversions;

pub use conversions::{classify_response, IntoSdkError};
