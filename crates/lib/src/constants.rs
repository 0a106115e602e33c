//! # Shared Constants
//!
//! Defaults shared across the `knowbatch` workspace. Configuration falls back
//! to these values when a setting is not provided.

/// The number of work items sent to the model in one request.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// The literal marker the model is asked to place between per-item JSON objects.
pub const DEFAULT_DELIMITER: &str = "-----";

/// Pause between consecutive batch requests, in milliseconds.
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 1000;

/// The input column that supplies the knowledge terms.
pub const DEFAULT_TERM_COLUMN: &str = "knowledge_term";

/// Where the enriched table is written when no path is given.
pub const DEFAULT_OUTPUT_PATH: &str = "knowledge_learning_output.csv";

/// The number of CSV rows sent to the model per request in the report flow.
pub const DEFAULT_REPORT_BLOCK_SIZE: usize = 30;

/// The model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// The heading printed at the top of rendered reports.
pub const DEFAULT_REPORT_TITLE: &str = "Knowledge Learning Report";

/// The port `knowbatch-server` listens on.
pub const DEFAULT_SERVER_PORT: u16 = 9090;

/// Upload requests above this size are rejected by the server (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Builds the `generateContent` endpoint for a Gemini model.
pub fn gemini_endpoint(model_name: &str) -> String {
    format!("https://generativelanguage.googleapis.com/v1beta/models/{model_name}:generateContent")
}
