//! # Enrichment Run Orchestration
//!
//! Drives one end-to-end enrichment run:
//!
//! 1. Split the input rows into batches.
//! 2. For each batch, compose the prompt, call the generation service once,
//!    and reconcile the reply into one record per row.
//! 3. Merge the records into the rows and append them to the output file.
//! 4. Sleep for the configured delay before the next batch.
//!
//! Execution is strictly sequential. A failed service call or a malformed
//! reply only affects its own batch; the run carries on with the next one.

use crate::{
    batch::batches,
    config::AppConfig,
    constants::{
        DEFAULT_BATCH_SIZE, DEFAULT_DELIMITER, DEFAULT_INTER_BATCH_DELAY_MS, DEFAULT_OUTPUT_PATH,
        DEFAULT_TERM_COLUMN,
    },
    errors::{BatchError, RunError},
    prompts::PromptComposer,
    providers::ai::AiProvider,
    reply::{parse_reply, ParsedReply},
    table::{CsvTable, IncrementalCsvWriter},
    types::{ResultField, ResultRecord, WorkItem},
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything a run needs besides the provider and the input.
#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    pub batch_size: usize,
    pub delimiter: String,
    pub inter_batch_delay: Duration,
    pub term_column: String,
    pub output_path: PathBuf,
    pub output_bom: bool,
    pub prompt_template: Option<String>,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delimiter: DEFAULT_DELIMITER.to_string(),
            inter_batch_delay: Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS),
            term_column: DEFAULT_TERM_COLUMN.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            output_bom: true,
            prompt_template: None,
        }
    }
}

impl EnrichmentOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let batch = &config.batch;
        Self {
            batch_size: batch.batch_size,
            delimiter: batch.delimiter.clone(),
            inter_batch_delay: Duration::from_millis(batch.inter_batch_delay_ms),
            term_column: batch.term_column.clone(),
            output_path: PathBuf::from(&batch.output_path),
            output_bom: batch.output_bom,
            prompt_template: config.prompts.enrichment.clone(),
        }
    }
}

/// Progress information handed to the caller after each batch is written.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub index: usize,
    pub batch_count: usize,
    /// Rows written so far, including this batch.
    pub rows_done: usize,
    pub rows_total: usize,
    pub outcome: ParsedReply,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub items: usize,
    pub batches: usize,
    pub service_failures: usize,
    pub malformed_fragments: usize,
    pub count_mismatches: usize,
    pub output_path: PathBuf,
}

/// Runs the batch enrichment flow against one generation service.
#[derive(Debug)]
pub struct Orchestrator<'a> {
    provider: &'a dyn AiProvider,
    composer: PromptComposer,
    options: EnrichmentOptions,
}

impl<'a> Orchestrator<'a> {
    /// Validates the options and prepares the prompt composer.
    pub fn new(provider: &'a dyn AiProvider, options: EnrichmentOptions) -> Result<Self, RunError> {
        if options.batch_size == 0 {
            return Err(BatchError::InvalidBatchSize.into());
        }
        let mut composer = PromptComposer::new(options.delimiter.clone())?;
        if let Some(template) = &options.prompt_template {
            composer = composer.with_template(template.clone());
        }
        Ok(Self {
            provider,
            composer,
            options,
        })
    }

    pub fn options(&self) -> &EnrichmentOptions {
        &self.options
    }

    /// Sends one batch and reconciles the reply.
    ///
    /// Never fails: a service error degrades every item to a default record.
    pub async fn process_batch(&self, items: &[WorkItem]) -> ParsedReply {
        let prompt = self.composer.compose(items);
        debug!("--> Sending batch prompt:\n{prompt}");

        match self.provider.generate(&prompt).await {
            Ok(reply) => {
                debug!("<-- Batch reply:\n{reply}");
                parse_reply(&reply, self.composer.delimiter(), items.len())
            }
            Err(e) => {
                warn!("Generation service call failed, defaulting {} items: {e}", items.len());
                ParsedReply::service_failure(items.len(), e)
            }
        }
    }

    /// Reads `input` and runs the flow over it.
    pub async fn run_file(&self, input: &Path) -> Result<RunSummary, RunError> {
        let table = CsvTable::read(input)?;
        self.run(&table).await
    }

    pub async fn run(&self, table: &CsvTable) -> Result<RunSummary, RunError> {
        self.run_with_progress(table, |_| {}).await
    }

    /// Runs the flow, calling `on_batch` after each batch is persisted.
    pub async fn run_with_progress<F>(
        &self,
        table: &CsvTable,
        mut on_batch: F,
    ) -> Result<RunSummary, RunError>
    where
        F: FnMut(&BatchReport),
    {
        let term_index = table.column_index(&self.options.term_column)?;
        let layout = OutputLayout::new(&table.headers);
        let mut writer = IncrementalCsvWriter::new(
            &self.options.output_path,
            layout.headers.clone(),
            self.options.output_bom,
        );
        writer.ensure_started()?;

        let sequence = batches(&table.rows, self.options.batch_size)?;
        let batch_count = sequence.len();
        let mut summary = RunSummary {
            items: table.rows.len(),
            batches: batch_count,
            output_path: self.options.output_path.clone(),
            ..Default::default()
        };
        info!(
            "Enriching {} rows from column '{}' in {} batches of up to {}",
            table.rows.len(),
            self.options.term_column,
            batch_count,
            self.options.batch_size
        );

        for batch in sequence {
            let items: Vec<WorkItem> = batch
                .items
                .iter()
                .map(|row| WorkItem::new(row.get(term_index).map(String::as_str).unwrap_or("")))
                .collect();

            let outcome = self.process_batch(&items).await;
            if outcome.is_service_failure() {
                summary.service_failures += 1;
            }
            summary.malformed_fragments += outcome.malformed_fragments();
            if outcome.has_count_mismatch() {
                summary.count_mismatches += 1;
            }

            let merged: Vec<Vec<String>> = batch
                .items
                .iter()
                .zip(&outcome.records)
                .map(|(row, record)| layout.merge(row, record))
                .collect();
            writer.append(&merged)?;
            info!("Processed {} / {}", batch.end(), table.rows.len());

            on_batch(&BatchReport {
                index: batch.index,
                batch_count,
                rows_done: batch.end(),
                rows_total: table.rows.len(),
                outcome,
            });

            let is_last = batch.index + 1 == batch_count;
            if !is_last && !self.options.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.options.inter_batch_delay).await;
            }
        }

        info!(
            "Run complete: {} rows, {} service failures, {} malformed fragments. Output: '{}'",
            summary.items,
            summary.service_failures,
            summary.malformed_fragments,
            summary.output_path.display()
        );
        Ok(summary)
    }
}

/// Where each result field lands in an output row.
///
/// A field whose name already exists as an input column overwrites that
/// column; every other field is appended as a new column.
#[derive(Debug, Clone)]
struct OutputLayout {
    headers: Vec<String>,
    input_width: usize,
    field_columns: Vec<(ResultField, usize)>,
}

impl OutputLayout {
    fn new(input_headers: &[String]) -> Self {
        let mut headers = input_headers.to_vec();
        let field_columns = ResultField::ALL
            .into_iter()
            .map(|field| {
                let column = match headers.iter().position(|h| h == field.key()) {
                    Some(existing) => existing,
                    None => {
                        headers.push(field.key().to_string());
                        headers.len() - 1
                    }
                };
                (field, column)
            })
            .collect();
        Self {
            headers,
            input_width: input_headers.len(),
            field_columns,
        }
    }

    fn merge(&self, row: &[String], record: &ResultRecord) -> Vec<String> {
        let mut out = row.to_vec();
        out.resize(self.headers.len().max(self.input_width), String::new());
        for (field, column) in &self.field_columns {
            out[*column] = record.cell_value(*field);
        }
        out
    }
}
