//! # `knowbatch-markdown`: Markdown Table Extraction
//!
//! Pulls a pipe table out of free model text so the renderers can draw a
//! real table. Anything that does not look like a table is kept as text.
//! Parsing never fails; the worst case is "no table".

use serde::Serialize;
use tracing::debug;

/// A table recovered from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// What a report renderer draws: a table when one was found, else the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum ReportContent {
    Table(MarkdownTable),
    Text(String),
}

impl ReportContent {
    pub fn from_reply(text: &str) -> Self {
        match parse_markdown_table(text) {
            Some(table) => ReportContent::Table(table),
            None => ReportContent::Text(text.to_string()),
        }
    }
}

/// Extracts the first pipe table from `text`.
///
/// Only lines starting with `|` are considered. The first is the header, the
/// second the separator. Later lines are rows when their cell count matches
/// the header. Repeats of the header row (as produced by several
/// concatenated blocks) are skipped together with the separator that follows
/// them. Elsewhere a separator-like row is only skipped when every cell has
/// at least three dashes, so placeholder rows such as `| - | - |` survive.
pub fn parse_markdown_table(text: &str) -> Option<MarkdownTable> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.starts_with('|'))
        .collect();
    if lines.len() < 3 {
        return None;
    }

    let headers = split_cells(lines[0]);
    let mut rows = Vec::new();
    let mut dropped = 0;
    let mut after_header = false;
    for line in &lines[2..] {
        let cells = split_cells(line);
        if cells == headers {
            after_header = true;
            continue;
        }
        let skip = is_separator(&cells) && (after_header || is_full_separator(&cells));
        after_header = false;
        if skip {
            continue;
        }
        if cells.len() == headers.len() {
            rows.push(cells);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!("Dropped {dropped} table rows with a mismatched cell count.");
    }

    Some(MarkdownTable { headers, rows })
}

fn split_cells(line: &str) -> Vec<String> {
    let inner = line.trim().trim_start_matches('|').trim_end_matches('|');
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn is_separator(cells: &[String]) -> bool {
    cells.iter().all(|cell| {
        let cell = cell.trim();
        cell.contains('-') && cell.chars().all(|c| c == '-' || c == ':')
    })
}

fn is_full_separator(cells: &[String]) -> bool {
    cells.iter().all(|cell| cell.matches('-').count() >= 3)
}
