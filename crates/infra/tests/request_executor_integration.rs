//! Integration tests for the request executor
//!
//! **Coverage:**
//! - Rate-limit cooperation: single retry, capped `Retry-After`, disabled flag
//! - Response classification with decoded and synthetic error details
//! - Account header and debug logging toggled at runtime

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::time::Duration;

use bankpartner_domain::constants::{headers, scopes};
use bankpartner_domain::{SdkError, SdkErrorCategory};
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{data_requests, mount_token_endpoint, open_session};

#[tokio::test]
async fn test_rate_limited_request_is_retried_once() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600).await;

    Mock::given(method("GET"))
        .and(path("/pix/v2/pix"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pix/v2/pix"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"pix": []}"#))
        .mount(&server)
        .await;

    let ctx = open_session(&server);
    let url = format!("{}/pix/v2/pix", server.uri());

    let body = ctx.session.executor().get(&url, scopes::PIX_READ).await.unwrap();

    assert_eq!(body, r#"{"pix": []}"#);
    assert_eq!(data_requests(&server).await.len(), 2);
}

#[tokio::test]
async fn test_second_rate_limit_is_surfaced() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600).await;

    Mock::given(method("POST"))
        .and(path("/banking/v2/pix"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_json(json!({"title": "Too many requests"})),
        )
        .mount(&server)
        .await;

    let ctx = open_session(&server);
    let url = format!("{}/banking/v2/pix", server.uri());

    let err = ctx
        .session
        .executor()
        .post(&url, scopes::PIX_PAYMENT_WRITE, r#"{"valor": 10}"#)
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(err.detail().title, "Too many requests");

    let requests = data_requests(&server).await;
    assert_eq!(requests.len(), 2);
    // The retry repeats the same body.
    assert_eq!(requests[0].body, requests[1].body);
}

#[tokio::test]
async fn test_long_retry_hint_surfaces_without_waiting() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "86400"))
        .mount(&server)
        .await;

    let ctx = open_session(&server);
    let url = format!("{}/banking/v2/extrato", server.uri());

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        ctx.session.executor().get(&url, scopes::STATEMENT_READ),
    )
    .await
    .expect("executor must not sleep on an oversized Retry-After");

    let err = result.unwrap_err();
    assert!(err.is_rate_limited());
    assert_eq!(data_requests(&server).await.len(), 1);
}

#[tokio::test]
async fn test_far_future_retry_date_surfaces_without_waiting() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600).await;

    let retry_at = (Utc::now() + chrono::Duration::days(1)).to_rfc2822();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", retry_at.as_str()))
        .mount(&server)
        .await;

    let ctx = open_session(&server);
    let url = format!("{}/banking/v2/extrato", server.uri());

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        ctx.session.executor().get(&url, scopes::STATEMENT_READ),
    )
    .await
    .expect("executor must not sleep until a far-future Retry-After date");

    assert!(matches!(result, Err(SdkError::Client { status: Some(429), .. })));
    assert_eq!(data_requests(&server).await.len(), 1);
}

#[tokio::test]
async fn test_rate_limit_control_disabled_surfaces_immediately() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .mount(&server)
        .await;

    let ctx = open_session(&server);
    ctx.session.set_rate_limit_control(false);
    let url = format!("{}/banking/v2/extrato", server.uri());

    let err = ctx.session.executor().get(&url, scopes::STATEMENT_READ).await.unwrap_err();

    assert!(matches!(err, SdkError::Client { status: Some(429), .. }));
    assert_eq!(data_requests(&server).await.len(), 1);
}

#[tokio::test]
async fn test_client_error_carries_decoded_body() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600).await;

    Mock::given(method("POST"))
        .and(path("/cobranca/v3/cobrancas"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "title": "Requisicao invalida",
            "detail": "Existem campos invalidos",
            "timestamp": "2024-05-10T12:00:00Z",
            "violacoes": [
                {"razao": "deve ser maior que zero", "propriedade": "valorNominal", "valor": "0"}
            ]
        })))
        .mount(&server)
        .await;

    let ctx = open_session(&server);
    let url = format!("{}/cobranca/v3/cobrancas", server.uri());

    let err = ctx
        .session
        .executor()
        .post(&url, scopes::BILLING_WRITE, r#"{"valorNominal": 0}"#)
        .await
        .unwrap_err();

    assert_eq!(err.category(), SdkErrorCategory::Client);
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.detail().title, "Requisicao invalida");
    assert_eq!(err.detail().violations.len(), 1);
    assert_eq!(err.detail().violations[0].property, "valorNominal");
}

#[tokio::test]
async fn test_server_error_without_body_uses_status_line() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let ctx = open_session(&server);
    let url = format!("{}/banking/v2/saldo", server.uri());

    let err = ctx.session.executor().get(&url, scopes::STATEMENT_READ).await.unwrap_err();

    assert!(matches!(err, SdkError::Server { status: 500, .. }));
    assert_eq!(err.detail().detail.as_deref(), Some("500 Internal Server Error"));
    // Server errors are not retried.
    assert_eq!(data_requests(&server).await.len(), 1);
}

#[tokio::test]
async fn test_account_header_sent_after_selection() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600).await;

    Mock::given(method("GET"))
        .and(header(headers::ACCOUNT, "11223344"))
        .respond_with(ResponseTemplate::new(200).set_body_string("with account"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("without account"))
        .mount(&server)
        .await;

    let ctx = open_session(&server);
    let url = format!("{}/banking/v2/saldo", server.uri());
    let executor = ctx.session.executor();

    assert_eq!(executor.get(&url, scopes::STATEMENT_READ).await.unwrap(), "without account");

    ctx.session.set_account(Some("11223344".to_string()));
    assert_eq!(executor.get(&url, scopes::STATEMENT_READ).await.unwrap(), "with account");

    ctx.session.set_account(None);
    assert_eq!(executor.get(&url, scopes::STATEMENT_READ).await.unwrap(), "without account");
}

#[tokio::test]
async fn test_debug_mode_does_not_change_results() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"title": "Not found"})))
        .mount(&server)
        .await;

    let ctx = open_session(&server);
    let executor = ctx.session.executor();
    let url = format!("{}/pix/v2/cob/abc", server.uri());

    let quiet_ok = executor.put(&url, scopes::IMMEDIATE_CHARGE_WRITE, "{}").await.unwrap();
    let quiet_err = executor.get(&url, scopes::IMMEDIATE_CHARGE_READ).await.unwrap_err();

    ctx.session.set_debug(true);
    let loud_ok = executor.put(&url, scopes::IMMEDIATE_CHARGE_WRITE, "{}").await.unwrap();
    let loud_err = executor.get(&url, scopes::IMMEDIATE_CHARGE_READ).await.unwrap_err();

    assert_eq!(quiet_ok, loud_ok);
    assert_eq!(quiet_err.status(), loud_err.status());
    assert_eq!(quiet_err.detail(), loud_err.detail());
}
