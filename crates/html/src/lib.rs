//! # `knowbatch-html`: HTML Report Rendering
//!
//! Turns [`ReportContent`] into a single self-contained HTML page and writes
//! it next to the other reports.

use chrono::{DateTime, Local};
use knowbatch::report::report_file_name;
use knowbatch_markdown::{MarkdownTable, ReportContent};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum HtmlRenderError {
    #[error("Failed to write HTML report '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

const STYLESHEET: &str = r#"body { font-family: Arial, Helvetica, sans-serif; margin: 40px; background-color: #fafafa; color: #333; }
h1 { text-align: center; color: #2c3e50; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th, td { padding: 8px 10px; border: 1px solid #ccc; text-align: left; vertical-align: top; }
th { background-color: #2c3e50; color: #fff; }
tr:nth-child(even) td { background-color: #f2f2f2; }
.report-text { white-space: pre-wrap; line-height: 1.6; background-color: #fff; padding: 20px; border: 1px solid #ddd; }"#;

/// Escapes the five characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders a complete HTML document for `content`.
pub fn render_html(content: &ReportContent, title: &str) -> String {
    let title = escape_html(title);
    let body = match content {
        ReportContent::Table(table) => render_table(table),
        ReportContent::Text(text) => {
            format!("<div class=\"report-text\">{}</div>", escape_html(text))
        }
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{STYLESHEET}\n</style>\n</head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    )
}

fn render_table(table: &MarkdownTable) -> String {
    let mut html = String::from("<table>\n<thead>\n<tr>");
    for header in &table.headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>");
    html
}

/// Renders `content` and writes it to `out_dir/report_<timestamp>.html`.
pub fn write_html_report(
    content: &ReportContent,
    title: &str,
    out_dir: &Path,
    now: &DateTime<Local>,
) -> Result<PathBuf, HtmlRenderError> {
    let path = out_dir.join(report_file_name("html", now));
    let io_error = |source| HtmlRenderError::Io {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(out_dir).map_err(io_error)?;
    fs::write(&path, render_html(content, title)).map_err(io_error)?;
    info!("HTML report written to '{}'", path.display());
    Ok(path)
}
