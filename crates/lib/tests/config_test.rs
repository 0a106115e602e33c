//! # Configuration Loading Tests
//!
//! Each test writes its own YAML file. The environment is process-wide, so
//! tests that touch it hold `ENV_LOCK`.

use knowbatch::{load_config, AppConfig, ConfigError};
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn load_yaml(content: &str) -> Result<AppConfig, ConfigError> {
    let dir = tempdir().unwrap();
    let path = dir.path().join("knowbatch.yml");
    std::fs::write(&path, content).unwrap();
    load_config(Some(path.to_str().unwrap()))
}

#[test]
fn test_yaml_values_override_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let config = load_yaml(
        r#"
ai:
  provider: local
  api_url: http://localhost:11434/v1/chat/completions
  model_name: llama3
batch:
  batch_size: 5
  delimiter: "@@@"
  inter_batch_delay_ms: 0
report:
  title: Weekly Review
"#,
    )
    .unwrap();

    assert_eq!(config.ai.provider, "local");
    assert_eq!(
        config.ai.endpoint().as_deref(),
        Some("http://localhost:11434/v1/chat/completions")
    );
    assert_eq!(config.batch.batch_size, 5);
    assert_eq!(config.batch.delimiter, "@@@");
    assert_eq!(config.batch.inter_batch_delay_ms, 0);
    // Untouched keys keep their defaults.
    assert_eq!(config.batch.term_column, "knowledge_term");
    assert!(config.batch.output_bom);
    assert_eq!(config.report.block_size, 30);
    assert_eq!(config.report.title, "Weekly Review");
}

#[test]
fn test_placeholders_expand_from_environment() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("KNOWBATCH_TEST_OUTPUT", "expanded.csv");
    let config = load_yaml("batch:\n  output_path: ${KNOWBATCH_TEST_OUTPUT}\n").unwrap();
    std::env::remove_var("KNOWBATCH_TEST_OUTPUT");

    assert_eq!(config.batch.output_path, "expanded.csv");
}

#[test]
fn test_prefixed_environment_overrides_file() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("KNOWBATCH_BATCH__BATCH_SIZE", "7");
    let result = load_yaml("batch:\n  batch_size: 3\n");
    std::env::remove_var("KNOWBATCH_BATCH__BATCH_SIZE");

    assert_eq!(result.unwrap().batch.batch_size, 7);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.yml");
    let err = load_config(Some(path.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn test_invalid_values_are_rejected() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let cases = [
        "batch:\n  batch_size: 0\n",
        "batch:\n  delimiter: \"\"\n",
        "report:\n  block_size: 0\n",
        "server:\n  max_upload_bytes: 0\n",
        "ai:\n  provider: carrier-pigeon\n",
        "ai:\n  provider: local\n",
    ];
    for yaml in cases {
        let err = load_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{yaml:?} gave {err:?}");
    }
}

#[test]
fn test_default_config_is_valid() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.batch.delimiter, "-----");
    assert_eq!(config.batch.batch_size, 10);
    assert!(config.ai.require_api_key().is_err());
}

#[test]
fn test_server_and_temperature_settings() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let config = load_yaml("ai:\n  temperature: 0.7\nserver:\n  port: 8000\n").unwrap();

    assert_eq!(config.ai.temperature, Some(0.7));
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.server.max_upload_bytes, 16 * 1024 * 1024);
    assert_eq!(AppConfig::default().ai.temperature, None);
}
