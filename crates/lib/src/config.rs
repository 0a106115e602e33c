//! # Application Configuration
//!
//! Configuration is loaded in layers with the `config` crate:
//!
//! 1. Defaults baked into the structs below.
//! 2. An optional YAML file (`knowbatch.yml` in the working directory, or an
//!    explicit path). `${VAR}` references inside it are expanded from the
//!    environment.
//! 3. `KNOWBATCH_`-prefixed environment variables, with `__` separating
//!    nested keys (e.g. `KNOWBATCH_BATCH__BATCH_SIZE=5`).
//!
//! Well-known credentials (`GEMINI_API_KEY`, `AI_API_KEY`, `REDDIT_USERNAME`,
//! `REDDIT_PASSWORD`) fill in secrets that are still unset afterwards.

use crate::constants::{
    gemini_endpoint, DEFAULT_BATCH_SIZE, DEFAULT_DELIMITER, DEFAULT_GEMINI_MODEL,
    DEFAULT_INTER_BATCH_DELAY_MS, DEFAULT_OUTPUT_PATH, DEFAULT_REPORT_BLOCK_SIZE,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REPORT_TITLE, DEFAULT_SERVER_PORT, DEFAULT_TERM_COLUMN,
};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::{env, fs, path::Path};
use thiserror::Error;
use tracing::info;

/// The file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "knowbatch.yml";

/// Configuration failures. All of them are fatal before any work starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    General(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `knowbatch.yml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub poster: PosterConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub prompts: PromptOverrides,
}

/// Which generation service to call and how.
#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// "gemini" or "local" (any OpenAI-compatible endpoint).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Sampling temperature. Left out of requests when unset.
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model_name() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: None,
            api_key: None,
            model_name: default_model_name(),
            temperature: None,
        }
    }
}

impl AiConfig {
    /// The endpoint to call, derived from the model name for Gemini.
    pub fn endpoint(&self) -> Option<String> {
        match (&self.api_url, self.provider.as_str()) {
            (Some(url), _) if !url.trim().is_empty() => Some(url.clone()),
            (_, "gemini") => Some(gemini_endpoint(&self.model_name)),
            _ => None,
        }
    }

    /// The API key, failing when it is absent or blank.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingCredential(
                    "set GEMINI_API_KEY (or KNOWBATCH_AI__API_KEY) in the environment or .env"
                        .to_string(),
                )
            })
    }
}

/// Settings for the batch enrichment flow.
#[derive(Debug, Deserialize, Clone)]
pub struct BatchConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,
    #[serde(default = "default_term_column")]
    pub term_column: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    /// Prefix the output with a UTF-8 BOM so spreadsheet tools pick the right encoding.
    #[serde(default = "default_true")]
    pub output_bom: bool,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}
fn default_inter_batch_delay_ms() -> u64 {
    DEFAULT_INTER_BATCH_DELAY_MS
}
fn default_term_column() -> String {
    DEFAULT_TERM_COLUMN.to_string()
}
fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            delimiter: default_delimiter(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            term_column: default_term_column(),
            output_path: default_output_path(),
            output_bom: true,
        }
    }
}

/// Settings for the report flow and its renderers.
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_report_title")]
    pub title: String,
    /// A TTF/OTF font for the PDF exporter; needed for non-Latin scripts.
    #[serde(default)]
    pub font_path: Option<String>,
}

fn default_block_size() -> usize {
    DEFAULT_REPORT_BLOCK_SIZE
}
fn default_output_dir() -> String {
    ".".to_string()
}
fn default_report_title() -> String {
    DEFAULT_REPORT_TITLE.to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            output_dir: default_output_dir(),
            title: default_report_title(),
            font_path: None,
        }
    }
}

/// Settings for handing a finished report to the community site.
#[derive(Debug, Deserialize, Clone)]
pub struct PosterConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
    #[serde(default = "default_destination")]
    pub default_destination: String,
}

fn default_site_url() -> String {
    "https://www.reddit.com".to_string()
}
fn default_share_base_url() -> String {
    "https://example.com/shared".to_string()
}
fn default_destination() -> String {
    "test".to_string()
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            site_url: default_site_url(),
            share_base_url: default_share_base_url(),
            default_destination: default_destination(),
        }
    }
}

/// Settings for the upload form served by `knowbatch-server`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted upload request, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_port() -> u16 {
    DEFAULT_SERVER_PORT
}
fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Optional replacements for the built-in prompt templates.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PromptOverrides {
    #[serde(default)]
    pub enrichment: Option<String>,
    #[serde(default)]
    pub report_block: Option<String>,
}

impl AppConfig {
    /// Rejects settings that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "batch.batch_size must be a positive integer".to_string(),
            ));
        }
        if self.batch.delimiter.is_empty() {
            return Err(ConfigError::Invalid(
                "batch.delimiter must not be empty".to_string(),
            ));
        }
        if self.report.block_size == 0 {
            return Err(ConfigError::Invalid(
                "report.block_size must be a positive integer".to_string(),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_upload_bytes must be a positive integer".to_string(),
            ));
        }
        match self.ai.provider.as_str() {
            "gemini" => {}
            "local" if self.ai.endpoint().is_some() => {}
            "local" => {
                return Err(ConfigError::Invalid(
                    "ai.api_url is required for the local provider".to_string(),
                ))
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unsupported ai.provider '{other}' (expected 'gemini' or 'local')"
                )))
            }
        }
        Ok(())
    }

    fn apply_credential_fallbacks(&mut self) {
        if self.ai.api_key.as_deref().map_or(true, str::is_empty) {
            self.ai.api_key = first_env(&["GEMINI_API_KEY", "AI_API_KEY"]);
        }
        if self.poster.username.is_none() {
            self.poster.username = first_env(&["REDDIT_USERNAME"]);
        }
        if self.poster.password.is_none() {
            self.poster.password = first_env(&["REDDIT_PASSWORD"]);
        }
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.is_empty())
}

// Reads a file and substitutes `${VAR}` references from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded_content.into_owned()))
}

/// Loads `.env`, the YAML file and the environment into an [`AppConfig`].
///
/// An explicit `path_override` must exist; the default file is optional.
pub fn load_config(path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let mut builder = ConfigBuilder::builder();

    let path = path_override.unwrap_or(DEFAULT_CONFIG_FILE);
    match read_and_substitute(path)? {
        Some(content) => {
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{path}'."
            )));
        }
        None => info!("No '{path}' found; using defaults and environment."),
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("KNOWBATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;
    config.apply_credential_fallbacks();
    config.validate()?;
    Ok(config)
}
