//! # knowbatch
//!
//! Sends batches of knowledge terms to a text-generation service and maps
//! the combined replies back onto the input rows, one structured record per
//! term, however the model misbehaves.
//!
//! The pieces, in pipeline order:
//!
//! - [`batch`]: lazy, order-preserving batching.
//! - [`prompts`]: the combined per-batch prompt and the report prompts.
//! - [`providers`]: the [`AiProvider`] seam and its Gemini / OpenAI-compatible clients.
//! - [`reply`]: splitting, decoding and count reconciliation of a batch reply.
//! - [`table`]: CSV input and incremental CSV output.
//! - [`orchestrator`]: the sequential enrichment run.
//! - [`report`]: block-wise table review for the report flow.

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod reply;
pub mod report;
pub mod table;
pub mod types;

pub use batch::{batches, Batch, Batches};
pub use config::{load_config, AppConfig, ConfigError};
pub use errors::{BatchError, PromptError, RunError, TableError};
pub use orchestrator::{BatchReport, EnrichmentOptions, Orchestrator, RunSummary};
pub use providers::ai::AiProvider;
pub use reply::{parse_reply, ParseDiagnostic, ParsedReply};
pub use table::{CsvTable, IncrementalCsvWriter};
pub use types::{ResultField, ResultRecord, WorkItem};
