//! Integration tests for the signed API client

mod common;

use std::collections::HashMap;

use mockito::{Matcher, Server};
use serde::Deserialize;

use huaweicloud::api::{ApiError, Client, ClientConfig};

#[derive(Debug, Deserialize)]
struct Probe {
    ok: bool,
}

fn test_client(server_url: &str, security_token: Option<&str>) -> Client {
    let mut endpoints = HashMap::new();
    endpoints.insert("cbh".to_string(), server_url.to_string());

    Client::new(ClientConfig {
        access_key: "test-ak".to_string(),
        secret_key: "test-sk".to_string(),
        security_token: security_token.map(|token| token.to_string()),
        region: common::TEST_REGION.to_string(),
        project_id: common::TEST_PROJECT_ID.to_string(),
        endpoints,
        insecure: false,
        max_retries: 0,
    })
    .expect("client config is valid")
}

#[tokio::test(flavor = "multi_thread")]
async fn requests_carry_signature_and_project_headers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/pid/cbs/instance/list")
        .match_header(
            "authorization",
            Matcher::Regex(
                "SDK-HMAC-SHA256 Access=test-ak, SignedHeaders=host;x-sdk-date, Signature=[0-9a-f]{64}"
                    .to_string(),
            ),
        )
        .match_header("x-sdk-date", Matcher::Regex(r"\d{8}T\d{6}Z".to_string()))
        .match_header("x-project-id", "pid")
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;

    let client = test_client(&server.url(), None);
    let url = format!("{}/v2/pid/cbs/instance/list", client.endpoint("cbh", None));
    let probe: Probe = client.get(&url).await.expect("request should succeed");

    assert!(probe.ok);
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn security_token_is_forwarded_when_present() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/pid/cbs/instance/list")
        .match_header("x-security-token", "temp-token")
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;

    let client = test_client(&server.url(), Some("temp-token"));
    let url = format!("{}/v2/pid/cbs/instance/list", client.endpoint("cbh", None));
    let _: Probe = client.get(&url).await.expect("request should succeed");

    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn error_bodies_become_structured_api_errors() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/pid/cbs/instance/list")
        .with_status(400)
        .with_body(r#"{"error_code": "CBH.10003", "error_msg": "flavor not found"}"#)
        .create_async()
        .await;

    let client = test_client(&server.url(), None);
    let url = format!("{}/v2/pid/cbs/instance/list", client.endpoint("cbh", None));
    let result: Result<Probe, ApiError> = client.get(&url).await;

    match result {
        Err(ApiError::Api {
            status,
            code,
            message,
        }) => {
            assert_eq!(status, 400);
            assert_eq!(code.as_deref(), Some("CBH.10003"));
            assert_eq!(message, "flavor not found");
        }
        other => panic!("expected ApiError::Api, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn not_found_is_mapped_for_state_removal() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/pid/cbs/instance/list")
        .with_status(404)
        .with_body(r#"{"error_code": "CBH.404", "error_msg": "gone"}"#)
        .create_async()
        .await;

    let client = test_client(&server.url(), None);
    let url = format!("{}/v2/pid/cbs/instance/list", client.endpoint("cbh", None));
    let result: Result<Probe, ApiError> = client.get(&url).await;

    assert!(result.err().is_some_and(|e| e.is_not_found()));
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/pid/cbs/instance/list")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let client = test_client(&server.url(), None);
    let url = format!("{}/v2/pid/cbs/instance/list", client.endpoint("cbh", None));
    let result: Result<Probe, ApiError> = client.get(&url).await;

    assert!(matches!(result, Err(ApiError::Auth)));
    mock.assert_async().await;
}
