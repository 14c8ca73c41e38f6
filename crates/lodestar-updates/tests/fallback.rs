//! Multi-server fallback against real HTTP endpoints

use std::sync::Arc;

use lodestar_cache::{Cache, MemoryOptionStore, MemoryStorage};
use lodestar_updates::{
    AttemptError, CheckFailure, LicenseStatus, UpdateCheck, UpdateClient, UpdaterConfig,
};
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Base URL of a port nothing listens on
fn closed_port() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn client(servers: Vec<String>, license_key: Option<&str>) -> UpdateClient {
    let options = match license_key {
        Some(key) => MemoryOptionStore::with_value("license_key", json!(key)),
        None => MemoryOptionStore::new(),
    };
    UpdateClient::from_config(
        UpdaterConfig::new("aurora", "https://blog.example.com", servers),
        Arc::new(Cache::new(Arc::new(MemoryStorage::new()))),
        Arc::new(options),
    )
    .unwrap()
}

#[tokio::test]
async fn test_second_server_answers_and_third_is_never_contacted() {
    let second = MockServer::start().await;
    let third = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/check-update"))
        .and(body_json(json!({
            "license_key": "KEY-1",
            "site_url": "https://blog.example.com",
            "slug": "aurora",
            "version": "1.0.0"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"new_version": "2.0.0"})))
        .expect(1)
        .mount(&second)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"new_version": "9.0.0"})))
        .expect(0)
        .mount(&third)
        .await;

    let client = client(vec![closed_port(), second.uri(), third.uri()], Some("KEY-1"));
    let info = client.request_update_info("1.0.0", "KEY-1").await.unwrap();

    assert_eq!(info.new_version, "2.0.0");
}

#[tokio::test]
async fn test_bad_status_and_bad_body_fall_through() {
    let failing = MockServer::start().await;
    let garbled = MockServer::start().await;
    let healthy = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&failing)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
        .expect(1)
        .mount(&garbled)
        .await;
    Mock::given(method("POST"))
        .and(path("/check-update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "new_version": "1.2.0",
            "package": "https://downloads.example.com/aurora-1.2.0.zip"
        })))
        .expect(1)
        .mount(&healthy)
        .await;

    let client = client(vec![failing.uri(), garbled.uri(), healthy.uri()], None);
    let update = client.check_for_update("1.0.0").await.unwrap();

    assert_eq!(update.new_version, "1.2.0");
    assert_eq!(
        update.package,
        "https://downloads.example.com/aurora-1.2.0.zip"
    );
}

#[tokio::test]
async fn test_every_server_failing_reports_each_attempt() {
    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&failing)
        .await;

    let client = client(vec![closed_port(), failing.uri()], None);

    match client.check_for_update_detailed("1.0.0").await {
        UpdateCheck::CheckFailed(CheckFailure::AllServersFailed(attempts)) => {
            assert_eq!(attempts.len(), 2);
            assert!(matches!(attempts[0].error, AttemptError::Transport(_)));
            assert_eq!(attempts[1].error, AttemptError::Status(500));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(client.check_for_update("1.0.0").await.is_none());
}

#[tokio::test]
async fn test_no_servers_configured() {
    let client = client(Vec::new(), None);

    assert_eq!(
        client.check_for_update_detailed("1.0.0").await,
        UpdateCheck::CheckFailed(CheckFailure::NoServers)
    );
    assert!(client.update_servers().is_empty());
}

#[tokio::test]
async fn test_license_rejection_stops_the_sweep() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/license/validate"))
        .and(body_json(json!({
            "license_key": "KEY-1",
            "site_url": "https://blog.example.com",
            "product": "aurora"
        })))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Invalid key"})))
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&second)
        .await;

    let client = client(vec![first.uri(), second.uri()], Some("KEY-1"));
    let result = client.validate_license("KEY-1").await;

    assert!(!result.valid);
    assert_eq!(result.message, "Invalid key");
}

#[tokio::test]
async fn test_license_accepted_after_unreachable_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/license/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Licensed to Example Ltd",
            "expires": "2030-01-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(vec![closed_port(), server.uri()], Some("KEY-1"));
    let result = client.validate_license("KEY-1").await;

    assert!(result.valid);
    assert_eq!(result.message, "Licensed to Example Ltd");
    assert_eq!(result.data.unwrap()["expires"], "2030-01-01");
}

#[tokio::test]
async fn test_license_unreachable_everywhere() {
    let client = client(vec![closed_port(), closed_port()], Some("KEY-1"));
    let result = client.validate_license("KEY-1").await;

    assert!(!result.valid);
    assert_eq!(result.message, "Unable to connect to license server.");
}

#[tokio::test]
async fn test_license_status_without_key_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(vec![server.uri()], Some(""));
    assert_eq!(client.license_status().await, LicenseStatus::inactive());
}

#[tokio::test]
async fn test_odd_optional_fields_do_not_discard_a_release() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check-update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "new_version": "2.0.0",
            "package": "https://downloads.example.com/aurora-2.0.0.zip",
            "url": {"href": "https://example.com/aurora"},
            "sections": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(vec![server.uri()], None);

    match client.check_for_update_detailed("1.0.0").await {
        UpdateCheck::UpdateAvailable(info) => {
            assert_eq!(info.new_version, "2.0.0");
            assert_eq!(info.url, "");
            assert!(info.sections.is_none());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
