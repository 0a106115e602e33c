//! # Report Text Generation
//!
//! The model-facing half of the report flow. A CSV table is sent in blocks,
//! each block asking for a reviewed Markdown table, and the replies are
//! concatenated into one text. A failed block is noted inline and the run
//! moves on. Turning that text into a document is left to the renderer crates.

use crate::{
    batch::batches,
    errors::{BatchError, PromptError, TableError},
    prompts::report::{compose_block_prompt, DEFAULT_REPORT_BLOCK_PROMPT},
    providers::ai::AiProvider,
    table::CsvTable,
};
use chrono::{DateTime, TimeZone};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("Failed to generate content: {0}")]
    Generation(#[from] PromptError),
}

/// Options for the block-wise table review.
#[derive(Debug, Clone)]
pub struct TableReportOptions<'a> {
    pub user_prompt: &'a str,
    pub block_size: usize,
    /// Replaces [`DEFAULT_REPORT_BLOCK_PROMPT`] when set.
    pub block_template: Option<&'a str>,
}

/// Sends `table` to the model block by block and concatenates the replies.
///
/// Each block contributes `Block {n}:\n{reply}\n\n`, or
/// `Block {n} error: {message}\n\n` when its call failed.
pub async fn generate_table_report(
    provider: &dyn AiProvider,
    table: &CsvTable,
    options: &TableReportOptions<'_>,
) -> Result<String, ReportError> {
    let template = options
        .block_template
        .unwrap_or(DEFAULT_REPORT_BLOCK_PROMPT);
    let total = table.rows.len();
    let mut cumulative = String::new();

    for block in batches(&table.rows, options.block_size)? {
        let number = block.index + 1;
        let csv = table.to_csv_string(block.items)?;
        let prompt = compose_block_prompt(
            template,
            block.offset + 1,
            block.end().min(total),
            &csv,
            options.user_prompt,
        );

        info!("Processing block {number}");
        match provider.generate(&prompt).await {
            Ok(reply) => {
                cumulative.push_str(&format!("Block {number}:\n{}\n\n", reply.trim()));
            }
            Err(e) => {
                let message = format!("Failed to generate content (block {number}): {e}");
                warn!("{message}");
                cumulative.push_str(&format!("Block {number} error: {message}\n\n"));
            }
        }
    }

    Ok(cumulative)
}

/// Sends a free-text prompt as-is. A failed call is fatal here since there is
/// nothing else to report on.
pub async fn generate_text_report(
    provider: &dyn AiProvider,
    user_prompt: &str,
) -> Result<String, ReportError> {
    info!("No table supplied; sending the prompt directly.");
    let reply = provider.generate(user_prompt).await?;
    Ok(reply.trim().to_string())
}

/// `report_%Y%m%d_%H%M%S.{extension}` for the given moment.
pub fn report_file_name<Tz>(extension: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("report_{}.{extension}", at.format("%Y%m%d_%H%M%S"))
}
