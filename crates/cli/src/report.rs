//! # `report`, `post` and `publish` Commands
//!
//! `report` asks the model for a reviewed table (or answers a free prompt)
//! and renders HTML and PDF files. `post` hands an existing file to the
//! poster, and `publish` does both in one go.

use crate::poster::{PostRequest, ReportPoster, ShareLinkPoster};
use anyhow::{bail, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use knowbatch::{
    prompts::DEFAULT_REPORT_USER_PROMPT,
    providers::create_provider,
    report::{generate_table_report, generate_text_report, TableReportOptions},
    AppConfig, CsvTable,
};
use knowbatch_html::write_html_report;
use knowbatch_markdown::ReportContent;
use knowbatch_pdf::{write_pdf_report, PdfOptions};
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_POST_TITLE: &str = "My knowledge learning report";

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Pdf,
}

#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// A CSV table to review block by block
    #[arg(long)]
    pub csv: Option<PathBuf>,
    /// Extra instructions; sent on its own when no CSV is given
    #[arg(long, short)]
    pub prompt: Option<String>,
    /// Directory for the rendered files (overrides report.output_dir)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Document title (overrides report.title)
    #[arg(long)]
    pub title: Option<String>,
    /// Rows per request in CSV mode (overrides report.block_size)
    #[arg(long)]
    pub block_size: Option<usize>,
    /// Which files to render
    #[arg(long = "format", value_enum, default_values_t = [ReportFormat::Html, ReportFormat::Pdf])]
    pub formats: Vec<ReportFormat>,
}

#[derive(Parser, Debug)]
pub struct PostArgs {
    /// The report file to share
    #[arg(long)]
    pub file: PathBuf,
    #[command(flatten)]
    pub target: PostTarget,
}

#[derive(Parser, Debug)]
pub struct PostTarget {
    /// Title of the post
    #[arg(long = "post-title", default_value = DEFAULT_POST_TITLE)]
    pub post_title: String,
    /// Community to post to (defaults to poster.default_destination)
    #[arg(long)]
    pub destination: Option<String>,
}

#[derive(Parser, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub report: ReportArgs,
    #[command(flatten)]
    pub target: PostTarget,
}

/// Paths of the files a report run produced.
#[derive(Debug, Default)]
pub struct RenderedReport {
    pub html: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

pub async fn handle_report(args: &ReportArgs, config: &AppConfig) -> Result<RenderedReport> {
    let user_prompt = args.prompt.as_deref().unwrap_or(DEFAULT_REPORT_USER_PROMPT);
    let table = match &args.csv {
        Some(path) => Some(CsvTable::read(path)?),
        None if args.prompt.is_some() => None,
        None => bail!("either --csv or --prompt is required"),
    };

    let provider = create_provider(&config.ai)?;
    let text = match &table {
        Some(table) => {
            let options = TableReportOptions {
                user_prompt,
                block_size: args.block_size.unwrap_or(config.report.block_size),
                block_template: config.prompts.report_block.as_deref(),
            };
            generate_table_report(provider.as_ref(), table, &options).await?
        }
        None => generate_text_report(provider.as_ref(), user_prompt).await?,
    };

    let content = ReportContent::from_reply(&text);
    match &content {
        ReportContent::Table(table) => info!("Parsed a table with {} rows.", table.rows.len()),
        ReportContent::Text(_) => info!("No table found; rendering the reply as text."),
    }

    let title = args.title.as_deref().unwrap_or(&config.report.title);
    let out_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.report.output_dir));
    let now = Local::now();
    let mut rendered = RenderedReport::default();

    if args.formats.contains(&ReportFormat::Html) {
        let path = write_html_report(&content, title, &out_dir, &now)?;
        println!("HTML report: {}", path.display());
        rendered.html = Some(path);
    }
    if args.formats.contains(&ReportFormat::Pdf) {
        let options = PdfOptions {
            font_path: config.report.font_path.as_ref().map(PathBuf::from),
            ..PdfOptions::default()
        };
        let path = write_pdf_report(&content, title, &out_dir, &options, &now)?;
        println!("PDF report: {}", path.display());
        rendered.pdf = Some(path);
    }
    Ok(rendered)
}

pub async fn handle_post(args: &PostArgs, config: &AppConfig) -> Result<()> {
    let poster = ShareLinkPoster::from_config(&config.poster)?;
    post_file(&poster, args.file.clone(), &args.target, config).await
}

pub async fn handle_publish(args: &PublishArgs, config: &AppConfig) -> Result<()> {
    // Credentials are checked before the model is called or anything is written.
    let poster = ShareLinkPoster::from_config(&config.poster)?;
    let rendered = handle_report(&args.report, config).await?;
    let Some(artifact) = rendered.pdf.or(rendered.html) else {
        bail!("no report file was rendered");
    };
    post_file(&poster, artifact, &args.target, config).await
}

async fn post_file(
    poster: &dyn ReportPoster,
    artifact: PathBuf,
    target: &PostTarget,
    config: &AppConfig,
) -> Result<()> {
    let request = PostRequest {
        artifact,
        title: target.post_title.clone(),
        destination: target
            .destination
            .clone()
            .unwrap_or_else(|| config.poster.default_destination.clone()),
    };
    let receipt = poster.post(&request).await?;
    println!("Post prepared for {}", receipt.submit_url);
    println!("Share link: {}", receipt.share_link);
    Ok(())
}
