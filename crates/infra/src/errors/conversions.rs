//! Conversions from external infrastructure errors into SDK errors.

use std::error::Error as StdError;

use bankpartner_domain::{ErrorDetail, SdkError};
use openssl::error::ErrorStack;
use reqwest::{Error as HttpError, StatusCode};

/// Extension trait to make the conversion logic explicit at call sites
pub trait IntoSdkError {
    fn into_sdk_error(self) -> SdkError;
}

/* -------------------------------------------------------------------------- */
/* HTTP responses → SdkError */
/* -------------------------------------------------------------------------- */

/// Classify a non-success response.
///
/// The body is decoded as an error payload when possible, otherwise a
/// synthetic detail carrying the status line is used. 5xx statuses become
/// `SdkError::Server`, everything else `SdkError::Client`.
pub fn classify_response(status: StatusCode, body: &str) -> SdkError {
    let detail = ErrorDetail::from_body(body).unwrap_or_else(|| {
        ErrorDetail::from_status_line(format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status")
        ))
    });

    if status.is_server_error() {
        SdkError::server(status.as_u16(), detail)
    } else {
        SdkError::client(status.as_u16(), detail)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SdkError */
/* -------------------------------------------------------------------------- */

fn source_chain(err: &HttpError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn looks_like_tls_failure(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["certificate", "tls", "ssl", "handshake"].iter().any(|needle| lower.contains(needle))
}

impl IntoSdkError for HttpError {
    fn into_sdk_error(self) -> SdkError {
        // Classify on the text without the URL; hosts and paths may contain
        // "tls" or "ssl".
        let url = self.url().map(ToString::to_string);
        let err = self.without_url();
        let cause = source_chain(&err);
        let message = match url {
            Some(url) => format!("{cause} (url: {url})"),
            None => cause.clone(),
        };

        if looks_like_tls_failure(&cause) {
            return if cause.to_ascii_lowercase().contains("expired") {
                SdkError::certificate_expired(message)
            } else {
                SdkError::certificate(message)
            };
        }

        if err.is_timeout() {
            return SdkError::transport(format!("HTTP request timed out: {message}"));
        }

        if err.is_connect() {
            return SdkError::transport(format!("HTTP connection failure: {message}"));
        }

        if let Some(status) = err.status() {
            return classify_response(status, "");
        }

        if err.is_decode() || err.is_body() {
            return SdkError::transport(format!("failed to read response body: {message}"));
        }

        SdkError::transport(message)
    }
}

/* -------------------------------------------------------------------------- */
/* openssl::error::ErrorStack → SdkError */
/* -------------------------------------------------------------------------- */

impl IntoSdkError for ErrorStack {
    fn into_sdk_error(self) -> SdkError {
        SdkError::certificate(format!("openssl: {self}"))
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → SdkError */
/* -------------------------------------------------------------------------- */

impl IntoSdkError for serde_json::Error {
    fn into_sdk_error(self) -> SdkError {
        SdkError::malformed_response(self.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
