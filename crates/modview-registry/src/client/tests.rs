//! Unit tests for registry client

use super::*;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn direct_client(server: &MockServer, sleeper: &RecordingSleeper) -> RegistryClient {
    RegistryClient::with_config(ClientConfig {
        registry_url: format!("{}/", server.uri()),
        relay: String::new(),
        ..ClientConfig::default()
    })
    .unwrap()
    .with_sleeper(Arc::new(sleeper.clone()))
}

fn package_json() -> serde_json::Value {
    serde_json::json!({
        "namespace": "Author",
        "name": "ModA",
        "full_name": "Author-ModA",
        "is_deprecated": true,
        "latest": { "icon": "https://cdn.example.com/a.png", "version_number": "1.0.0" }
    })
}

#[tokio::test]
async fn test_registry_client_creation() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(client.base_url.as_str(), "https://thunderstore.io/");
    assert_eq!(client.relay, "https://corsproxy.io/?url=");
    assert_eq!(client.rate_limit.cooldown, Duration::from_secs(60));
}

#[tokio::test]
async fn test_registry_client_with_token() {
    let config = ClientConfig {
        token: Some("test-token".to_string()),
        ..ClientConfig::default()
    };
    assert!(RegistryClient::with_config(config).is_ok());
}

#[tokio::test]
async fn test_invalid_registry_url() {
    let config = ClientConfig {
        registry_url: "not a url".to_string(),
        ..ClientConfig::default()
    };
    assert!(matches!(
        RegistryClient::with_config(config),
        Err(ModviewError::ConfigValidation { .. })
    ));
}

#[tokio::test]
async fn test_endpoints() {
    let client = RegistryClient::new().unwrap();

    assert_eq!(
        client.profile_endpoint("abc123").unwrap(),
        "https://thunderstore.io/api/experimental/legacyprofile/get/abc123/"
    );
    assert_eq!(
        client
            .package_endpoint(&PackageRef::new("Author", "ModA"))
            .unwrap(),
        "https://thunderstore.io/api/experimental/package/Author/ModA/"
    );
}

#[tokio::test]
async fn test_profile_identifier_is_path_encoded() {
    let client = RegistryClient::new().unwrap();
    let endpoint = client.profile_endpoint("a/b c").unwrap();
    assert_eq!(
        endpoint,
        "https://thunderstore.io/api/experimental/legacyprofile/get/a%2Fb%20c/"
    );
}

#[tokio::test]
async fn test_request_url_wraps_endpoint_in_relay() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(
        client.request_url("https://thunderstore.io/api/experimental/package/A/B/"),
        "https://corsproxy.io/?url=https%3A%2F%2Fthunderstore.io%2Fapi%2Fexperimental%2Fpackage%2FA%2FB%2F"
    );
}

#[tokio::test]
async fn test_request_url_without_relay() {
    let client = RegistryClient::with_config(ClientConfig {
        relay: String::new(),
        ..ClientConfig::default()
    })
    .unwrap();
    assert_eq!(client.request_url("https://example.com/x/"), "https://example.com/x/");
}

#[tokio::test]
async fn test_fetch_package_success() {
    let server = MockServer::start().await;
    let sleeper = RecordingSleeper::new();

    Mock::given(method("GET"))
        .and(path("/api/experimental/package/Author/ModA/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(package_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = direct_client(&server, &sleeper);
    let endpoint = client
        .package_endpoint(&PackageRef::new("Author", "ModA"))
        .unwrap();
    let metadata = client.fetch_package(&endpoint).await.unwrap();

    assert!(metadata.is_deprecated);
    assert_eq!(metadata.icon(), Some("https://cdn.example.com/a.png"));
    assert!(sleeper.recorded().is_empty());
}

#[tokio::test]
async fn test_fetch_through_relay() {
    let server = MockServer::start().await;
    let sleeper = RecordingSleeper::new();
    let endpoint = "https://thunderstore.io/api/experimental/package/Author/ModA/";

    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(query_param("url", endpoint))
        .and(header("Authorization", "Bearer relay-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(package_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = RegistryClient::with_config(ClientConfig {
        relay: format!("{}/proxy?url=", server.uri()),
        token: Some("relay-token".to_string()),
        ..ClientConfig::default()
    })
    .unwrap()
    .with_sleeper(Arc::new(sleeper.clone()));

    let metadata = client.fetch_package(endpoint).await.unwrap();
    assert_eq!(metadata.full_name.as_deref(), Some("Author-ModA"));
}

#[tokio::test]
async fn test_rate_limit_retries_once_after_hint() {
    let server = MockServer::start().await;
    let sleeper = RecordingSleeper::new();

    Mock::given(method("GET"))
        .and(path("/api/experimental/package/Author/ModA/"))
        .respond_with(ResponseTemplate::new(403).insert_header("retry-after", "5"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/experimental/package/Author/ModA/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(package_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = direct_client(&server, &sleeper);
    let endpoint = format!("{}/api/experimental/package/Author/ModA/", server.uri());
    let metadata = client.fetch_package(&endpoint).await.unwrap();

    assert!(metadata.is_deprecated);
    assert_eq!(sleeper.recorded(), vec![Duration::from_millis(5000)]);
}

#[tokio::test]
async fn test_second_rate_limit_is_terminal() {
    let server = MockServer::start().await;
    let sleeper = RecordingSleeper::new();

    Mock::given(method("GET"))
        .and(path("/api/experimental/package/Author/ModA/"))
        .respond_with(ResponseTemplate::new(403).insert_header("retry-after", "5"))
        .expect(2)
        .mount(&server)
        .await;

    let client = direct_client(&server, &sleeper);
    let endpoint = format!("{}/api/experimental/package/Author/ModA/", server.uri());
    let result = client.fetch_live(&endpoint).await;

    match result {
        Err(ModviewError::RateLimited { retry_after, .. }) => assert_eq!(retry_after, Some(5)),
        other => panic!("Expected RateLimited error, got {:?}", other.map(|r| r.status())),
    }
    // One backoff, two requests, no third attempt
    assert_eq!(sleeper.recorded().len(), 1);
    assert!(sleeper.total() >= Duration::from_millis(5000));
}

#[tokio::test]
async fn test_rate_limit_without_hint_uses_cooldown() {
    let server = MockServer::start().await;
    let sleeper = RecordingSleeper::new();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;

    let client = direct_client(&server, &sleeper);
    let result = client.fetch_live(&format!("{}/x/", server.uri())).await;

    assert!(matches!(result, Err(ModviewError::RateLimited { retry_after: None, .. })));
    assert_eq!(sleeper.recorded(), vec![Duration::from_secs(60)]);
}

#[tokio::test]
async fn test_not_found_is_unreachable_without_retry() {
    let server = MockServer::start().await;
    let sleeper = RecordingSleeper::new();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = direct_client(&server, &sleeper);
    let result = client.fetch_live(&format!("{}/missing/", server.uri())).await;

    match result {
        Err(ModviewError::Unreachable { status, .. }) => assert_eq!(status, Some(404)),
        other => panic!("Expected Unreachable error, got {:?}", other.map(|r| r.status())),
    }
    assert!(sleeper.recorded().is_empty());
}

#[tokio::test]
async fn test_network_failure_is_unreachable() {
    let sleeper = RecordingSleeper::new();
    // Port 9 (discard) on localhost is not expected to accept HTTP
    let client = RegistryClient::with_config(ClientConfig {
        registry_url: "http://127.0.0.1:9/".to_string(),
        relay: String::new(),
        timeout: Duration::from_secs(2),
        ..ClientConfig::default()
    })
    .unwrap()
    .with_sleeper(Arc::new(sleeper.clone()));

    let result = client.fetch_live("http://127.0.0.1:9/x/").await;
    assert!(matches!(result, Err(ModviewError::Unreachable { status: None, .. })));
    assert!(sleeper.recorded().is_empty());
}

#[tokio::test]
async fn test_fetch_once_reports_rate_limit_immediately() {
    let server = MockServer::start().await;
    let sleeper = RecordingSleeper::new();

    Mock::given(method("GET"))
        .and(path("/api/experimental/legacyprofile/get/abc123/"))
        .respond_with(ResponseTemplate::new(403).insert_header("retry-after", "12"))
        .expect(1)
        .mount(&server)
        .await;

    let client = direct_client(&server, &sleeper);
    let result = client.fetch_profile_payload("abc123").await;

    match result {
        Err(err @ ModviewError::RateLimited { .. }) => {
            assert_eq!(err.to_string(), "Rate-limit hit, retry in 12s");
        },
        other => panic!("Expected RateLimited error, got {:?}", other),
    }
    assert!(sleeper.recorded().is_empty());
}

#[tokio::test]
async fn test_fetch_profile_payload_returns_raw_bytes() {
    let server = MockServer::start().await;
    let sleeper = RecordingSleeper::new();

    Mock::given(method("GET"))
        .and(path("/api/experimental/legacyprofile/get/abc123/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"#r2modman\nUEsFBg==".to_vec()))
        .mount(&server)
        .await;

    let client = direct_client(&server, &sleeper);
    let payload = client.fetch_profile_payload("abc123").await.unwrap();
    assert_eq!(payload, b"#r2modman\nUEsFBg==");
}

#[tokio::test]
async fn test_retry_delay_parsing() {
    let client = RegistryClient::new().unwrap();

    let mut headers = HeaderMap::new();
    assert_eq!(client.retry_delay(&headers), Duration::from_secs(60));

    headers.insert(RETRY_AFTER, "5".parse().unwrap());
    assert_eq!(client.retry_delay(&headers), Duration::from_millis(5000));

    headers.insert(RETRY_AFTER, " 0 ".parse().unwrap());
    assert_eq!(client.retry_delay(&headers), Duration::ZERO);

    // HTTP-date form is not understood; fall back to the cooldown
    headers.insert(RETRY_AFTER, "Wed, 21 Oct 2015 07:28:00 GMT".parse().unwrap());
    assert_eq!(client.retry_delay(&headers), Duration::from_secs(60));
}
