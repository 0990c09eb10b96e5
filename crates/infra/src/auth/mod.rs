//! OAuth2 token acquisition

pub mod token_provider;

pub use token_provider::TokenProvider;
