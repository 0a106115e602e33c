//! # `enrich` Command
//!
//! Runs the batch enrichment flow over a CSV file and prints progress.

use anyhow::Result;
use clap::Parser;
use knowbatch::{
    providers::create_provider, AppConfig, BatchReport, CsvTable, EnrichmentOptions, Orchestrator,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
pub struct EnrichArgs {
    /// The CSV file holding the knowledge terms
    #[arg(long, short)]
    pub input: PathBuf,
    /// Where to write the enriched CSV (overrides batch.output_path)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Terms per request (overrides batch.batch_size)
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Line separating per-term replies (overrides batch.delimiter)
    #[arg(long)]
    pub delimiter: Option<String>,
    /// Pause between requests in milliseconds (overrides batch.inter_batch_delay_ms)
    #[arg(long)]
    pub delay_ms: Option<u64>,
    /// The column holding the terms (overrides batch.term_column)
    #[arg(long)]
    pub term_column: Option<String>,
    /// Do not prefix the output with a UTF-8 BOM
    #[arg(long)]
    pub no_bom: bool,
}

impl EnrichArgs {
    fn options(&self, config: &AppConfig) -> EnrichmentOptions {
        let mut options = EnrichmentOptions::from_config(config);
        if let Some(output) = &self.output {
            options.output_path = output.clone();
        }
        if let Some(size) = self.batch_size {
            options.batch_size = size;
        }
        if let Some(delimiter) = &self.delimiter {
            options.delimiter = delimiter.clone();
        }
        if let Some(delay) = self.delay_ms {
            options.inter_batch_delay = Duration::from_millis(delay);
        }
        if let Some(column) = &self.term_column {
            options.term_column = column.clone();
        }
        if self.no_bom {
            options.output_bom = false;
        }
        options
    }
}

pub async fn handle_enrich(args: &EnrichArgs, config: &AppConfig) -> Result<()> {
    let options = args.options(config);
    // Read and check the input before building a provider so bad input never costs a call.
    let table = CsvTable::read(&args.input)?;
    table.column_index(&options.term_column)?;

    let provider = create_provider(&config.ai)?;
    let orchestrator = Orchestrator::new(provider.as_ref(), options)?;
    info!("Starting enrichment of '{}'", args.input.display());

    let summary = orchestrator
        .run_with_progress(&table, |report: &BatchReport| {
            let note = if report.outcome.is_service_failure() {
                " (service failure, defaults written)"
            } else if !report.outcome.diagnostics.is_empty() {
                " (reply reconciled)"
            } else {
                ""
            };
            println!("Processed {} / {}{note}", report.rows_done, report.rows_total);
        })
        .await?;

    println!(
        "Done: {} rows in {} batches ({} service failures, {} malformed fragments). Output: {}",
        summary.items,
        summary.batches,
        summary.service_failures,
        summary.malformed_fragments,
        summary.output_path.display()
    );
    Ok(())
}
