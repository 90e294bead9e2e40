#![allow(deprecated)]

/// End-to-end tests for the `ragconsole` binary
///
/// These run the compiled binary against a `wiremock` backend and check
/// exit status and printed transcript. The interactive console needs a
/// terminal and is covered by unit tests instead.
use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
mod common;

fn ragconsole(config_path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("ragconsole").unwrap();
    cmd.env_remove("RAG_API_URL")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config_path);
    cmd
}

/// Runs a prepared command off the async runtime so the mock server keeps
/// serving while the binary blocks on it.
async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .expect("command task")
        .expect("command runs");
    output.assert()
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("ragconsole").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("ingest"))
        .stdout(predicate::str::contains("--api-url"));
}

#[test]
fn test_invalid_api_url_is_rejected() {
    let (_temp_dir, config_path) = common::temp_config_file("console:\n  show_banner: false\n");

    let mut cmd = ragconsole(&config_path);
    cmd.arg("--api-url").arg("ftp://files.example.com").arg("health");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

#[test]
fn test_zero_timeout_in_config_is_rejected() {
    let (_temp_dir, config_path) = common::temp_config_file("backend:\n  timeout_seconds: 0\n");

    let mut cmd = ragconsole(&config_path);
    cmd.arg("ask").arg("hello");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must be greater than 0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_prints_query_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"response":"Revenue grew 12%.","sources":["q3.pdf"]}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (_temp_dir, config_path) = common::temp_config_file("console:\n  show_banner: false\n");
    let mut cmd = ragconsole(&config_path);
    cmd.arg("--api-url").arg(server.uri()).arg("ask").arg("How did Q3 go?");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("How did Q3 go?"))
        .stdout(predicate::str::contains("Revenue grew 12%."))
        .stdout(predicate::str::contains("Sources: q3.pdf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_failure_prints_notice_and_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (_temp_dir, config_path) = common::temp_config_file("console:\n  show_banner: false\n");
    let mut cmd = ragconsole(&config_path);
    cmd.env("RAG_API_URL", server.uri()).arg("ask").arg("Q");

    run(cmd)
        .await
        .failure()
        .stdout(predicate::str::contains("connection to the agent was lost"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ingest_uploads_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"status":"success","filename":"handbook.pdf","chunks":1}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (temp_dir, config_path) = common::temp_config_file("console:\n  show_banner: false\n");
    let document = temp_dir.path().join("handbook.pdf");
    std::fs::write(&document, b"%PDF-1.4 handbook").unwrap();

    let mut cmd = ragconsole(&config_path);
    cmd.arg("--api-url").arg(server.uri()).arg("ingest").arg(&document);

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Document indexed: handbook.pdf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_reports_healthy_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"status":"healthy"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let (_temp_dir, config_path) = common::temp_config_file("console:\n  show_banner: false\n");
    let mut cmd = ragconsole(&config_path);
    cmd.arg("--api-url").arg(server.uri()).arg("health");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("is healthy"));
}
