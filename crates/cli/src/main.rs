//! # knowbatch: batch knowledge enrichment from the command line
//!
//! This is the main entry point for the `knowbatch` command-line interface.

mod enrich;
mod poster;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use enrich::{handle_enrich, EnrichArgs};
use knowbatch::load_config;
use report::{handle_post, handle_publish, handle_report, PostArgs, PublishArgs, ReportArgs};
use std::fs::File;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "knowbatch.log";

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML config file (defaults to ./knowbatch.yml when present)
    #[arg(long, global = true, env = "KNOWBATCH_CONFIG")]
    config: Option<String>,
    /// Where to write the log (RUST_LOG controls the level)
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enrich every knowledge term of a CSV file in batches
    Enrich(EnrichArgs),
    /// Review a CSV table (or answer a prompt) and render HTML/PDF reports
    Report(ReportArgs),
    /// Share an existing report file
    Post(PostArgs),
    /// Render a report and share it
    Publish(PublishArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Enrich(_) => "Enrich",
            Commands::Report(_) => "Report",
            Commands::Post(_) => "Post",
            Commands::Publish(_) => "Publish",
        }
    }
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging to a file
    let log_file = File::create(&cli.log_file)?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Err(e) = run(&cli).await {
        error!("{} failed: {e:#}", cli.command.name());
        eprintln!("{} failed: {e:#}", cli.command.name());
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Enrich(args) => handle_enrich(args, &config).await,
        Commands::Report(args) => handle_report(args, &config).await.map(|_| ()),
        Commands::Post(args) => handle_post(args, &config).await,
        Commands::Publish(args) => handle_publish(args, &config).await,
    }
}
