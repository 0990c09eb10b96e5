//! Shared helpers for infra integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use bankpartner_core::MockClock;
use bankpartner_domain::constants::TOKEN_PATH;
use bankpartner_domain::ConfigBuilder;
use bankpartner_infra::testing::CertificateFixture;
use bankpartner_infra::Session;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const CLIENT_ID: &str = "integration-client";
pub const CLIENT_SECRET: &str = "integration-secret";
pub const CERT_PASSWORD: &str = "integration-pass";

static TRACING: Once = Once::new();

/// Install a test subscriber once per binary; `RUST_LOG` controls output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Session wired to a mock server, with a controllable clock.
pub struct TestSession {
    pub session: Session,
    pub clock: MockClock,
    _certificate: CertificateFixture,
}

/// Builder pointing at `server` and presenting `certificate`.
pub fn session_builder(server: &MockServer, certificate: &CertificateFixture) -> ConfigBuilder {
    ConfigBuilder::new()
        .environment("SANDBOX")
        .client_id(CLIENT_ID)
        .client_secret(CLIENT_SECRET)
        .certificate(certificate.path(), CERT_PASSWORD)
        .base_url(server.uri())
        .rate_limit_backoff(Duration::ZERO)
}

pub fn open_session(server: &MockServer) -> TestSession {
    open_session_with_certificate_days(server, 365)
}

pub fn open_session_with_certificate_days(server: &MockServer, days: i64) -> TestSession {
    init_tracing();
    let certificate = CertificateFixture::expiring_in_days(days, CERT_PASSWORD);
    let config = session_builder(server, &certificate).build().expect("valid test config");
    let clock = MockClock::new();
    let session = Session::with_clock(config, Arc::new(clock.clone()));
    TestSession { session, clock, _certificate: certificate }
}

/// Token endpoint issuing `token-1`, `token-2`, ... and counting requests.
pub async fn mount_token_endpoint(server: &MockServer, expires_in: i64) -> Arc<AtomicUsize> {
    mount_token_endpoint_with_delay(server, expires_in, Duration::ZERO).await
}

pub async fn mount_token_endpoint_with_delay(
    server: &MockServer,
    expires_in: i64,
    delay: Duration,
) -> Arc<AtomicUsize> {
    let issued = Arc::new(AtomicUsize::new(0));
    let counter = issued.clone();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(move |_req: &Request| -> ResponseTemplate {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "access_token": format!("token-{n}"),
                    "token_type": "Bearer",
                    "expires_in": expires_in,
                    "scope": "any"
                }))
                .set_delay(delay)
        })
        .mount(server)
        .await;

    issued
}

/// Requests received by `server` on paths other than the token endpoint.
pub async fn data_requests(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() != TOKEN_PATH)
        .collect()
}
