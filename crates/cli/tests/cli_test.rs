//! # `knowbatch` Binary Tests
//!
//! Runs the real binary inside a temp directory, pointed at a mock
//! OpenAI-compatible server through `KNOWBATCH_` environment overrides.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn knowbatch(dir: &Path, api_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("knowbatch").unwrap();
    cmd.current_dir(dir)
        .env_remove("GEMINI_API_KEY")
        .env_remove("AI_API_KEY")
        .env_remove("REDDIT_USERNAME")
        .env_remove("REDDIT_PASSWORD")
        .env_remove("KNOWBATCH_CONFIG")
        .env("KNOWBATCH_AI__PROVIDER", "local")
        .env("KNOWBATCH_AI__API_URL", api_url)
        .env("KNOWBATCH_BATCH__INTER_BATCH_DELAY_MS", "0");
    cmd
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

fn workspace_with_terms() -> TempDir {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("terms.csv"),
        "knowledge_term\nentropy\nosmosis\nphotosynthesis\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("knowbatch")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("enrich")
                .and(predicate::str::contains("report"))
                .and(predicate::str::contains("post"))
                .and(predicate::str::contains("publish")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_enrich_writes_enriched_csv() {
    // --- 1. Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply(
            "{\"definition\": \"first\"}\n-----\n{\"definition\": \"second\"}",
        ))
        .expect(2)
        .mount(&server)
        .await;
    let dir = workspace_with_terms();

    // --- 2. Act & Assert ---
    knowbatch(dir.path(), &server.uri())
        .args(["enrich", "--input", "terms.csv", "--output", "out.csv", "--batch-size", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 / 3"))
        .stdout(predicate::str::contains("Processed 3 / 3"));

    let output = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].trim_start_matches('\u{feff}').starts_with("knowledge_term,definition"));
    assert!(lines[1].starts_with("entropy,first"));
    assert!(lines[2].starts_with("osmosis,second"));
    // The last batch had one term, so the surplus fragment is dropped.
    assert!(lines[3].starts_with("photosynthesis,first"));
    assert!(dir.path().join("knowbatch.log").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_enrich_survives_service_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;
    let dir = workspace_with_terms();

    knowbatch(dir.path(), &server.uri())
        .args(["enrich", "-i", "terms.csv", "-o", "out.csv", "--no-bom"])
        .assert()
        .success()
        .stdout(predicate::str::contains("service failure"));

    let output = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
    assert!(output.starts_with("knowledge_term,"));
    assert!(output.contains("osmosis,,,,,[]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_enrich_missing_column_fails_without_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply("{}"))
        .expect(0)
        .mount(&server)
        .await;
    let dir = workspace_with_terms();

    knowbatch(dir.path(), &server.uri())
        .args(["enrich", "-i", "terms.csv", "--term-column", "topic"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Enrich failed:").and(predicate::str::contains("topic")));
}

#[test]
fn test_invalid_config_is_fatal() {
    let dir = workspace_with_terms();

    knowbatch(dir.path(), "http://127.0.0.1:9")
        .env("KNOWBATCH_BATCH__BATCH_SIZE", "0")
        .args(["enrich", "-i", "terms.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch_size must be a positive integer"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_report_renders_html_table() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply(
            "| term | definition |\n|---|---|\n| entropy | <disorder> |",
        ))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    knowbatch(dir.path(), &server.uri())
        .args(["report", "--prompt", "Review entropy.", "--format", "html", "--output-dir", "reports"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HTML report:"));

    let reports: Vec<_> = std::fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);
    let html = std::fs::read_to_string(&reports[0]).unwrap();
    assert!(html.contains("<td>&lt;disorder&gt;</td>"));
}

#[test]
fn test_report_needs_csv_or_prompt() {
    let dir = tempdir().unwrap();
    knowbatch(dir.path(), "http://127.0.0.1:9")
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("either --csv or --prompt is required"));
}

#[test]
fn test_post_prints_submit_url() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("report.pdf"), b"%PDF-1.7").unwrap();

    knowbatch(dir.path(), "http://127.0.0.1:9")
        .env("REDDIT_USERNAME", "learner")
        .env("REDDIT_PASSWORD", "secret")
        .args(["post", "--file", "report.pdf", "--destination", "study"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://www.reddit.com/r/study/submit")
                .and(predicate::str::contains("/shared/report.pdf")),
        );
}

#[test]
fn test_post_without_credentials_fails() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("report.pdf"), b"%PDF-1.7").unwrap();

    knowbatch(dir.path(), "http://127.0.0.1:9")
        .args(["post", "--file", "report.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Post failed: Poster is not configured"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_publish_without_credentials_renders_nothing() {
    // --- 1. Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply("| term |\n|---|\n| entropy |"))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    // --- 2. Act & Assert ---
    knowbatch(dir.path(), &server.uri())
        .args(["publish", "--prompt", "x", "--output-dir", "r"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Publish failed: Poster is not configured"));

    assert!(!dir.path().join("r").exists());
}
