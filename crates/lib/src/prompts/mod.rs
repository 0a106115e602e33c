//! # Prompt Templates
//!
//! Prompt construction for the enrichment and report flows. Templates are
//! plain strings with `{placeholder}` markers so they can be overridden from
//! configuration.

pub mod enrichment;
pub mod report;

pub use enrichment::{compose_batch_prompt, PromptComposer, DEFAULT_ENRICHMENT_PROMPT};
pub use report::{compose_block_prompt, DEFAULT_REPORT_BLOCK_PROMPT, DEFAULT_REPORT_USER_PROMPT};
