//! Heartbeat probe against a `wiremock` GraphQL endpoint.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crm_jobs::{run_heartbeat, HeartbeatClient, HeartbeatStatus};

fn test_client(url: &str) -> HeartbeatClient {
    HeartbeatClient::new(url, Duration::from_secs(5)).expect("failed to build HeartbeatClient")
}

#[tokio::test]
async fn ok_response_is_logged_as_alive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_json(json!({ "query": "{ hello }" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "hello": "Hello, GraphQL!" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("heartbeat.txt");
    let client = test_client(&format!("{}/graphql", server.uri()));

    let status = run_heartbeat(&client, &log).await.expect("heartbeat");

    assert_eq!(status, HeartbeatStatus::Ok);
    let content = std::fs::read_to_string(&log).expect("read log");
    assert!(content.ends_with(" CRM is alive (GraphQL OK)\n"), "got: {content}");
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/graphql", server.uri()));

    assert_eq!(client.probe().await, HeartbeatStatus::Error(503));
}

#[tokio::test]
async fn slow_endpoint_counts_as_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = HeartbeatClient::new(
        &format!("{}/graphql", server.uri()),
        Duration::from_millis(200),
    )
    .expect("client");

    assert!(matches!(
        client.probe().await,
        HeartbeatStatus::Unreachable(_)
    ));
}

#[tokio::test]
async fn refused_connection_is_still_logged() {
    // Port 9 (discard) is not listening on test hosts.
    let client = test_client("http://127.0.0.1:9/graphql");
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("heartbeat.txt");

    let status = run_heartbeat(&client, &log).await.expect("heartbeat");

    assert!(matches!(status, HeartbeatStatus::Unreachable(_)));
    let content = std::fs::read_to_string(&log).expect("read log");
    assert!(content.contains("CRM is alive (GraphQL unreachable: "));
}
