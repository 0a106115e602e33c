//! # Reply Parsing and Reconciliation
//!
//! Turns the free-text reply for one batch back into exactly one
//! [`ResultRecord`] per work item. The model is unreliable: it may wrap
//! objects in code fences, emit broken JSON, or produce too few or too many
//! parts. None of that is an error for the caller. Bad fragments become
//! all-default records and the final count is forced to the expected one.

use crate::types::ResultRecord;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

const FENCE: &str = "```";

/// A non-fatal problem observed while reconciling a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDiagnostic {
    /// A fragment could not be decoded as a JSON object.
    MalformedFragment { index: usize, error: String },
    /// The reply held a different number of fragments than the batch had items.
    CountMismatch { expected: usize, produced: usize },
    /// The generation service call failed; the whole batch was defaulted.
    ServiceFailure { error: String },
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDiagnostic::MalformedFragment { index, error } => {
                write!(f, "fragment {index} is not a valid JSON object: {error}")
            }
            ParseDiagnostic::CountMismatch { expected, produced } => {
                write!(f, "expected {expected} records but the reply produced {produced}")
            }
            ParseDiagnostic::ServiceFailure { error } => {
                write!(f, "generation service failed: {error}")
            }
        }
    }
}

/// Records reconciled for one batch plus whatever went wrong along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub records: Vec<ResultRecord>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedReply {
    /// The outcome for a batch whose service call failed outright.
    pub fn service_failure(expected: usize, error: impl fmt::Display) -> Self {
        Self {
            records: ResultRecord::defaults(expected),
            diagnostics: vec![ParseDiagnostic::ServiceFailure {
                error: error.to_string(),
            }],
        }
    }

    pub fn malformed_fragments(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, ParseDiagnostic::MalformedFragment { .. }))
            .count()
    }

    pub fn has_count_mismatch(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, ParseDiagnostic::CountMismatch { .. }))
    }

    pub fn is_service_failure(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, ParseDiagnostic::ServiceFailure { .. }))
    }
}

/// Splits `reply` on `delimiter` and reconciles the parts to `expected` records.
///
/// The returned `records` always has length `expected`, whatever the input.
pub fn parse_reply(reply: &str, delimiter: &str, expected: usize) -> ParsedReply {
    let mut diagnostics = Vec::new();
    let mut records = Vec::new();

    let fragments: Box<dyn Iterator<Item = &str>> = if delimiter.is_empty() {
        Box::new(std::iter::once(reply))
    } else {
        Box::new(reply.split(delimiter))
    };

    for fragment in fragments.map(str::trim).filter(|f| !f.is_empty()) {
        let index = records.len();
        match parse_fragment(fragment) {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!("Failed to parse reply fragment {index}: {error}");
                debug!("Unparsable fragment {index}: {fragment}");
                diagnostics.push(ParseDiagnostic::MalformedFragment { index, error });
                records.push(ResultRecord::default());
            }
        }
    }

    let produced = records.len();
    if produced != expected {
        warn!("Reply produced {produced} records for a batch of {expected}; reconciling.");
        diagnostics.push(ParseDiagnostic::CountMismatch { expected, produced });
    }
    records.resize_with(expected, ResultRecord::default);

    ParsedReply {
        records,
        diagnostics,
    }
}

/// Decodes one fragment into a normalized record.
///
/// The error string describes why decoding failed.
pub fn parse_fragment(fragment: &str) -> Result<ResultRecord, String> {
    let cleaned = strip_code_fence(fragment);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => Ok(ResultRecord::from_map(map)),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

/// Removes a surrounding markdown code fence from a fragment.
///
/// Only applies when the trimmed text starts with a fence: the first line is
/// dropped if it opens a fence and the last line is dropped if it is exactly
/// a closing fence.
pub fn strip_code_fence(fragment: &str) -> String {
    let cleaned = fragment.trim();
    if !cleaned.starts_with(FENCE) {
        return cleaned.to_string();
    }

    let mut lines: Vec<&str> = cleaned.lines().collect();
    if lines.first().is_some_and(|line| line.starts_with(FENCE)) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|line| line.trim() == FENCE) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
