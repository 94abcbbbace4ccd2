//! Failure injection tests: unreachable, slow and misbehaving authorities.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{client, gateway_config, set_cookies, MockAuthority, Reply, TestGateway};

fn internal_error() -> Value {
    json!({"success": false, "error": "Internal server error"})
}

#[tokio::test]
async fn test_unreachable_authority() {
    // Nothing listens on port 1.
    let gateway = TestGateway::start(gateway_config("http://127.0.0.1:1")).await;

    let res = client()
        .get(gateway.url("/obtain-anti-forgery-token"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(set_cookies(&res).is_empty());
    assert_eq!(res.json::<Value>().await.unwrap(), internal_error());

    let res = client()
        .post(gateway.url("/authenticate"))
        .json(&json!({"username": "a", "password": "b"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await.unwrap(), internal_error());
}

#[tokio::test]
async fn test_slow_authority_times_out() {
    let authority = MockAuthority::start(
        Reply::json(200, r#"{"success":true,"token":"late"}"#).with_delay(Duration::from_secs(5)),
    )
    .await;
    let mut config = gateway_config(&authority.base_url());
    config.upstream.timeout_secs = 1;
    let gateway = TestGateway::start(config).await;

    let start = Instant::now();
    let res = client()
        .post(gateway.url("/authenticate"))
        .json(&json!({"username": "a", "password": "b"}))
        .send()
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(set_cookies(&res).is_empty());
    assert_eq!(res.json::<Value>().await.unwrap(), internal_error());
}

#[tokio::test]
async fn test_non_json_authority_body() {
    let authority = MockAuthority::start(
        Reply::text(200, "<html>maintenance</html>").with_cookie("csrf=abc"),
    )
    .await;
    let gateway = TestGateway::start(gateway_config(&authority.base_url())).await;

    let res = client()
        .get(gateway.url("/obtain-anti-forgery-token"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(set_cookies(&res).is_empty());
    assert_eq!(res.json::<Value>().await.unwrap(), internal_error());
}

#[tokio::test]
async fn test_authority_error_status_is_relayed() {
    let body = r#"{"success":false,"error":"database unavailable"}"#;
    let authority = MockAuthority::start(Reply::json(500, body)).await;
    let gateway = TestGateway::start(gateway_config(&authority.base_url())).await;

    let res = client()
        .post(gateway.url("/authenticate"))
        .json(&json!({"username": "a", "password": "b"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), body);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let authority = MockAuthority::start(Reply::json(200, r#"{"success":true}"#)).await;
    let mut config = gateway_config(&authority.base_url());
    config.listener.max_body_size = 64;
    let gateway = TestGateway::start(config).await;

    let padding = "x".repeat(256);
    let res = client()
        .post(gateway.url("/authenticate"))
        .json(&json!({"username": padding, "password": "b"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(authority.requests().is_empty());
}

#[tokio::test]
async fn test_request_deadline_answers_with_envelope() {
    let authority = MockAuthority::start(
        Reply::json(200, r#"{"success":true}"#).with_delay(Duration::from_secs(3)),
    )
    .await;
    let mut config = gateway_config(&authority.base_url());
    config.listener.request_timeout_secs = 1;
    let gateway = TestGateway::start(config).await;

    let start = Instant::now();
    let res = client()
        .post(gateway.url("/authenticate"))
        .json(&json!({"username": "a", "password": "b"}))
        .send()
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"success": false, "error": "Request timeout"})
    );
}
