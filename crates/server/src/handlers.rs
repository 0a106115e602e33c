use super::{errors::AppError, page, state::AppState};
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::Local;
use knowbatch::{
    prompts::DEFAULT_REPORT_USER_PROMPT,
    report::{generate_table_report, generate_text_report, ReportError, TableReportOptions},
    CsvTable,
};
use knowbatch_html::write_html_report;
use knowbatch_markdown::ReportContent;
use knowbatch_pdf::{write_pdf_report, PdfOptions};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub async fn root() -> Html<String> {
    Html(page::index_page(DEFAULT_REPORT_USER_PROMPT))
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// Handles the form: an optional `csv_file` part and a `user_prompt` part.
///
/// With a file, the table is reviewed block by block; without one, the
/// prompt is sent on its own. A missing or blank prompt falls back to the
/// default one. The HTML report must be written; a PDF failure is shown on
/// the result page instead of failing the request.
pub async fn report_handler(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut user_prompt: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "csv_file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was chosen.
                if !file_name.is_empty() || !bytes.is_empty() {
                    upload = Some((file_name, bytes.to_vec()));
                }
            }
            "user_prompt" => user_prompt = Some(field.text().await?),
            other => debug!("Ignoring form field '{other}'"),
        }
    }

    let user_prompt = user_prompt
        .filter(|prompt| !prompt.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REPORT_USER_PROMPT.to_string());
    let config = &app_state.config;
    let provider = app_state.ai_provider.as_ref();

    let text = match &upload {
        Some((file_name, bytes)) => {
            info!("Report requested for upload '{file_name}' ({} bytes)", bytes.len());
            let table = CsvTable::from_reader(bytes.as_slice()).map_err(ReportError::from)?;
            let options = TableReportOptions {
                user_prompt: &user_prompt,
                block_size: config.report.block_size,
                block_template: config.prompts.report_block.as_deref(),
            };
            generate_table_report(provider, &table, &options).await?
        }
        None => generate_text_report(provider, &user_prompt).await?,
    };

    let content = ReportContent::from_reply(&text);
    let out_dir = app_state.output_dir();
    let title = &config.report.title;
    let now = Local::now();

    let mut files = Vec::new();
    let mut pdf_error = None;
    let pdf_options = PdfOptions {
        font_path: config.report.font_path.as_ref().map(PathBuf::from),
        ..PdfOptions::default()
    };
    match write_pdf_report(&content, title, &out_dir, &pdf_options, &now) {
        Ok(path) => files.push(file_name_of(&path)),
        Err(e) => {
            warn!("PDF export failed: {e}");
            pdf_error = Some(e.to_string());
        }
    }
    let html_path =
        write_html_report(&content, title, &out_dir, &now).map_err(anyhow::Error::from)?;
    files.push(file_name_of(&html_path));

    Ok(Html(page::result_page(&text, &files, pdf_error.as_deref())))
}

/// Sends a rendered report from the output directory as an attachment.
pub async fn download_handler(
    State(app_state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    if !is_report_file_name(&file) {
        return Err(AppError::BadRequest(format!(
            "'{file}' is not a report file name"
        )));
    }

    let path = app_state.output_dir().join(&file);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("File '{file}' not found")));
        }
        Err(e) => return Err(AppError::Internal(e.into())),
    };
    info!("Serving '{}' ({} bytes)", path.display(), bytes.len());

    let headers = [
        (header::CONTENT_TYPE, content_type(&file).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// Only bare `report_*.pdf` and `report_*.html` names are served.
pub fn is_report_file_name(name: &str) -> bool {
    name.starts_with("report_")
        && (name.ends_with(".pdf") || name.ends_with(".html"))
        && !name.contains(&['/', '\\'][..])
        && !name.contains("..")
}

fn content_type(file: &str) -> &'static str {
    if file.ends_with(".pdf") {
        "application/pdf"
    } else {
        "text/html; charset=utf-8"
    }
}

fn file_name_of(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
