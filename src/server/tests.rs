use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;

use crate::settings::Config;
use crate::engine::SecureHeaders;
use crate::nonce::NonceGenerator;
use crate::handlers::{HealthResponse, MetricsResponse, ProfileResponse};
use crate::server::Server;

const CHROME_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const IE_UA: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64; Trident/7.0; rv:11.0) like Gecko";

const TEST_CONFIG: &str = r#"
[server]
trust_forwarded_proto = true

[headers.default]
x_frame_options = "DENY"

[headers.default.csp]
default_src = ["'self'"]
script_src = ["'self'"]

[headers.named.relaxed]
x_xss_protection = "0"
"#;

fn create_test_server() -> TestServer {
    let config = Config::from_toml(TEST_CONFIG).expect("Failed to parse test config");
    let server =
        Server::new(config, Arc::new(SecureHeaders::new())).expect("Failed to create server");
    TestServer::new(server.create_router()).expect("Failed to create test server")
}

fn https() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-proto"),
        HeaderValue::from_static("https"),
    )
}

fn header_str(response: &axum_test::TestResponse, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .map(|value| value.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert!(health.configured);
    assert_eq!(health.profiles, vec!["relaxed".to_string()]);
}

#[tokio::test]
async fn test_headers_on_plaintext_request() {
    let server = create_test_server();

    let response = server.get("/health").await;
    assert_eq!(header_str(&response, "x-frame-options").as_deref(), Some("DENY"));
    assert_eq!(
        header_str(&response, "x-content-type-options").as_deref(),
        Some("nosniff")
    );
    assert_eq!(
        header_str(&response, "content-security-policy").as_deref(),
        Some("default-src 'self'; script-src 'self'")
    );
    assert!(header_str(&response, "strict-transport-security").is_none());
    assert!(header_str(&response, "server").is_none());
}

#[tokio::test]
async fn test_hsts_behind_https_proxy() {
    let server = create_test_server();
    let (name, value) = https();

    let response = server.get("/health").add_header(name, value).await;
    assert_eq!(
        header_str(&response, "strict-transport-security").as_deref(),
        Some("max-age=631138519")
    );
}

#[tokio::test]
async fn test_index_nonce_matches_csp() {
    let server = create_test_server();

    let response = server
        .get("/")
        .add_header(header::USER_AGENT, HeaderValue::from_static(CHROME_UA))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.text();
    let nonce = body
        .split("nonce=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("page carries a nonce");
    assert!(!nonce.is_empty());

    let csp = header_str(&response, "content-security-policy").unwrap();
    assert_eq!(
        csp,
        format!("default-src 'self'; script-src 'self' 'nonce-{nonce}'")
    );
}

#[tokio::test]
async fn test_index_without_nonce_support() {
    let server = create_test_server();

    let response = server
        .get("/")
        .add_header(header::USER_AGENT, HeaderValue::from_static(IE_UA))
        .await;
    assert_eq!(
        header_str(&response, "content-security-policy").as_deref(),
        Some("default-src 'self'; script-src 'self'")
    );
}

#[tokio::test]
async fn test_nonces_differ_between_requests() {
    let server = create_test_server();

    let first = server
        .get("/")
        .add_header(header::USER_AGENT, HeaderValue::from_static(CHROME_UA))
        .await;
    let second = server
        .get("/")
        .add_header(header::USER_AGENT, HeaderValue::from_static(CHROME_UA))
        .await;

    assert_ne!(
        header_str(&first, "content-security-policy"),
        header_str(&second, "content-security-policy")
    );
}

#[tokio::test]
async fn test_embed_drops_frame_options() {
    let server = create_test_server();

    let response = server.get("/embed").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(header_str(&response, "x-frame-options").is_none());
    assert_eq!(
        header_str(&response, "content-security-policy").as_deref(),
        Some("default-src 'self'; script-src 'self'; frame-ancestors 'self' https:")
    );
}

#[tokio::test]
async fn test_named_profile() {
    let server = create_test_server();

    let response = server.get("/profiles/relaxed").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let profile: ProfileResponse = response.json();
    assert_eq!(profile.profile, "relaxed");
    assert_eq!(header_str(&response, "x-xss-protection").as_deref(), Some("0"));
    // inherited from the default table
    assert_eq!(header_str(&response, "x-frame-options").as_deref(), Some("DENY"));

    let response = server.get("/profiles/missing").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        header_str(&response, "x-xss-protection").as_deref(),
        Some("1; mode=block")
    );
}

#[tokio::test]
async fn test_metrics() {
    let server = create_test_server();

    let _ = server.get("/health").await;
    let _ = server
        .get("/")
        .add_header(header::USER_AGENT, HeaderValue::from_static(CHROME_UA))
        .await;

    let response = server.get("/metrics").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let metrics: MetricsResponse = response.json();
    assert_eq!(metrics.responses, 2);
    assert_eq!(metrics.nonces_issued, 1);
    assert_eq!(metrics.resolution_errors, 0);
}

/// Emits a nonce that cannot be carried in a header value.
struct BrokenNonces;

impl NonceGenerator for BrokenNonces {
    fn generate(&self) -> String {
        "bad\nnonce".to_string()
    }
}

#[tokio::test]
async fn test_unsendable_header_value_fails_closed() {
    let config = Config::from_toml(TEST_CONFIG).expect("Failed to parse test config");
    let engine = SecureHeaders::with_nonce_generator(Arc::new(BrokenNonces));
    let server = Server::new(config, Arc::new(engine)).expect("Failed to create server");
    let server = TestServer::new(server.create_router()).expect("Failed to create test server");

    let response = server
        .get("/")
        .add_header(header::USER_AGENT, HeaderValue::from_static(CHROME_UA))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(header_str(&response, "content-security-policy").is_none());

    let metrics: MetricsResponse = server.get("/metrics").await.json();
    assert_eq!(metrics.resolution_errors, 1);
    assert_eq!(metrics.responses, 0);
}

#[test]
fn test_invalid_config_fails_startup() {
    let config = Config::from_toml("[headers.default]\nhsts = \"lol\"\n").unwrap();
    assert!(Server::new(config, Arc::new(SecureHeaders::new())).is_err());
}
