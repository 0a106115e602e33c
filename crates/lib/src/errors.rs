use thiserror::Error;

/// Errors raised while talking to a generation service.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("API key is missing")]
    MissingApiKey,
    #[error("AI provider is not configured: {0}")]
    MissingAiProvider(String),
}

/// Errors raised when splitting work into batches.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchError {
    #[error("Batch size must be a positive integer")]
    InvalidBatchSize,
    #[error("Delimiter must not be empty")]
    EmptyDelimiter,
}

/// Errors raised while reading or writing tabular files.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Column '{0}' not found in input table")]
    MissingColumn(String),
    #[error("The input table has no header row")]
    NoHeaders,
}

/// Errors that abort an enrichment run.
///
/// Per-item and per-batch problems never surface here; they are contained in
/// the run and reported through [`crate::reply::ParseDiagnostic`].
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Table(#[from] TableError),
}
