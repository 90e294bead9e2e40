//! HTTP backend integration tests
//!
//! Exercises `HttpBackend` against a `wiremock` mock server: request shape
//! for `/chat`, `/ingest` and `/health`, and how non-success statuses and
//! malformed bodies surface as errors.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ragconsole::backend::{Document, HttpBackend, RagBackend};
use ragconsole::config::BackendConfig;
use ragconsole::RagConsoleError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Construct an `HttpBackend` pointing at the given wiremock base URL.
fn make_backend(base_url: &str) -> HttpBackend {
    let config = BackendConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        ..BackendConfig::default()
    };
    HttpBackend::new(&config).expect("valid backend config")
}

fn json_body(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(value.to_string().into_bytes(), "application/json")
}

// ---------------------------------------------------------------------------
// /chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_chat_posts_message_and_parses_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "What is in the Q3 report?" })))
        .respond_with(json_body(json!({ "response": "Revenue grew 12%." })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = make_backend(&server.uri());
    let reply = backend
        .chat("What is in the Q3 report?")
        .await
        .expect("chat should succeed");

    assert_eq!(reply.response, "Revenue grew 12%.");
    assert_eq!(reply.transcript_text(), "Revenue grew 12%.");
}

#[tokio::test]
async fn test_chat_sources_are_appended_to_transcript_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(json_body(json!({
            "response": "See the handbook.",
            "sources": ["handbook.pdf", "faq.pdf"]
        })))
        .mount(&server)
        .await;

    let backend = make_backend(&server.uri());
    let reply = backend.chat("where?").await.expect("chat should succeed");

    assert_eq!(
        reply.sources.as_deref(),
        Some(&["handbook.pdf".to_string(), "faq.pdf".to_string()][..])
    );
    assert!(reply.transcript_text().ends_with("Sources: handbook.pdf, faq.pdf"));
}

#[tokio::test]
async fn test_chat_server_error_is_err() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let backend = make_backend(&server.uri());
    let err = backend.chat("Q").await.unwrap_err();
    assert!(err.to_string().contains("500"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_chat_malformed_body_is_err() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(json_body(json!({ "answer": "wrong field" })))
        .mount(&server)
        .await;

    let backend = make_backend(&server.uri());
    let err = backend.chat("Q").await.unwrap_err();
    assert!(err.to_string().contains("Malformed"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_chat_timeout_is_err() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            json_body(json!({ "response": "too late" })).set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = BackendConfig {
        base_url: server.uri(),
        timeout_seconds: 1,
        ..BackendConfig::default()
    };
    let backend = HttpBackend::new(&config).unwrap();
    assert!(backend.chat("Q").await.is_err());
}

#[tokio::test]
async fn test_chat_unreachable_backend_is_err() {
    // Nothing listens on port 9 (discard) in the test environment.
    let backend = make_backend("http://127.0.0.1:9");
    let err = backend.chat("Q").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RagConsoleError>(),
        Some(RagConsoleError::Http(_))
    ));
}

// ---------------------------------------------------------------------------
// /ingest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ingest_sends_multipart_file_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ingest"))
        .and(header_exists("content-type"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"Q3 Report.pdf\""))
        .and(body_string_contains("%PDF-1.7 fake"))
        .respond_with(json_body(json!({
            "status": "success",
            "filename": "Q3 Report.pdf",
            "chunks": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = make_backend(&server.uri());
    let receipt = backend
        .ingest(Document::new("Q3 Report.pdf", b"%PDF-1.7 fake".to_vec()))
        .await
        .expect("ingest should succeed");

    assert!(receipt.is_success());
    assert_eq!(receipt.filename.as_deref(), Some("Q3 Report.pdf"));
    assert_eq!(receipt.chunks, Some(1));
}

#[tokio::test]
async fn test_ingest_non_success_status_field_is_ok_but_not_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(json_body(json!({ "status": "queued" })))
        .mount(&server)
        .await;

    let backend = make_backend(&server.uri());
    let receipt = backend
        .ingest(Document::new("doc.pdf", b"%PDF".to_vec()))
        .await
        .expect("body parses");
    assert!(!receipt.is_success());
}

#[tokio::test]
async fn test_ingest_rejected_file_is_err() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_raw(r#"{"detail":"Only PDF files are allowed"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let backend = make_backend(&server.uri());
    let err = backend
        .ingest(Document::new("notes.txt", b"plain".to_vec()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("400"), "unexpected error: {err}");
}

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(json_body(json!({ "status": "healthy" })))
        .mount(&server)
        .await;

    let backend = make_backend(&server.uri());
    let health = backend.health().await.expect("health should succeed");
    assert!(health.is_healthy());
}

#[tokio::test]
async fn test_health_with_trailing_slash_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(json_body(json!({ "status": "degraded" })))
        .mount(&server)
        .await;

    let backend = make_backend(&format!("{}/", server.uri()));
    let health = backend.health().await.unwrap();
    assert!(!health.is_healthy());
}
