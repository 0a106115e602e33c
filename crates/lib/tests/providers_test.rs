//! # Provider HTTP Tests
//!
//! Runs the Gemini and OpenAI-compatible clients against a local mock server.

mod common;

use common::setup_tracing;
use knowbatch::{
    config::AiConfig,
    providers::{
        ai::{gemini::GeminiProvider, local::LocalAiProvider},
        create_provider,
    },
    AiProvider, PromptError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_gemini_returns_first_candidate_text() {
    // --- 1. Arrange ---
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/test:generateContent"))
        .and(query_param("key", "secret"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "hello"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"definition\":\"x\"}"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(
        format!("{}/v1beta/models/test:generateContent", server.uri()),
        "secret".to_string(),
    )
    .unwrap();

    // --- 2. Act ---
    let reply = provider.generate("hello").await.unwrap();

    // --- 3. Assert ---
    assert_eq!(reply, "{\"definition\":\"x\"}");
}

#[tokio::test]
async fn test_gemini_without_candidates_is_empty() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(server.uri(), "k".to_string()).unwrap();
    assert_eq!(provider.generate("p").await.unwrap(), "");
}

#[tokio::test]
async fn test_gemini_error_status_is_reported() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(server.uri(), "k".to_string()).unwrap();
    let err = provider.generate("p").await.unwrap_err();

    match err {
        PromptError::AiApi(message) => {
            assert!(message.contains("429"), "{message}");
            assert!(message.contains("quota exceeded"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_gemini_rejects_blank_key() {
    let err = GeminiProvider::new("http://localhost".to_string(), "  ".to_string()).unwrap_err();
    assert!(matches!(err, PromptError::MissingApiKey));
}

#[tokio::test]
async fn test_local_provider_sends_chat_request() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer local-key"))
        .and(body_partial_json(json!({
            "model": "llama",
            "messages": [{"role": "user", "content": "terms"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "reply text"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = LocalAiProvider::new(
        format!("{}/v1/chat/completions", server.uri()),
        Some("local-key".to_string()),
        Some("llama".to_string()),
    )
    .unwrap();

    assert_eq!(provider.generate("terms").await.unwrap(), "reply text");
}

#[tokio::test]
async fn test_factory_builds_local_provider_from_config() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let config = AiConfig {
        provider: "local".to_string(),
        api_url: Some(server.uri()),
        api_key: None,
        model_name: "any".to_string(),
        temperature: None,
    };
    let provider = create_provider(&config).unwrap();
    assert_eq!(provider.generate("x").await.unwrap(), "ok");
}

#[test]
fn test_factory_requires_gemini_key() {
    let config = AiConfig::default();
    let err = create_provider(&config).unwrap_err();
    assert!(matches!(err, PromptError::MissingApiKey));
}

#[test]
fn test_factory_rejects_unknown_provider() {
    let config = AiConfig {
        provider: "carrier-pigeon".to_string(),
        api_url: Some("http://localhost".to_string()),
        ..AiConfig::default()
    };
    let err = create_provider(&config).unwrap_err();
    assert!(matches!(err, PromptError::MissingAiProvider(_)));
}

#[tokio::test]
async fn test_configured_temperature_is_sent() {
    // --- 1. Arrange ---
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"temperature": 0.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "warm"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let config = AiConfig {
        provider: "local".to_string(),
        api_url: Some(server.uri()),
        temperature: Some(0.5),
        ..AiConfig::default()
    };

    // --- 2. Act ---
    let reply = create_provider(&config).unwrap().generate("x").await.unwrap();

    // --- 3. Assert ---
    assert_eq!(reply, "warm");
}

#[tokio::test]
async fn test_unset_temperature_is_left_out() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = LocalAiProvider::new(server.uri(), None, None).unwrap();
    provider.generate("x").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("temperature").is_none(), "{body}");
    assert!(body.get("model").is_none(), "{body}");
    assert_eq!(body["stream"], json!(false));
}

#[tokio::test]
async fn test_gemini_temperature_goes_into_generation_config() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"generationConfig": {"temperature": 0.25}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "cool"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(server.uri(), "k".to_string())
        .unwrap()
        .with_temperature(Some(0.25));

    assert_eq!(provider.generate("p").await.unwrap(), "cool");
}
