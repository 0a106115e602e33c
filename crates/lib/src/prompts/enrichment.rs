//! # Batch Enrichment Prompt
//!
//! Builds the single combined prompt sent for one batch of knowledge terms.
//! The model is asked to answer with one JSON object per term, separated by a
//! delimiter line, which [`crate::reply::parse_reply`] later splits apart.

use crate::{constants::DEFAULT_DELIMITER, errors::BatchError, types::ResultField, WorkItem};
use serde_json::{Map, Value};

/// The default instruction template for a batch.
///
/// Placeholders: `{count}`, `{items}`, `{fields}`, `{delimiter}`, `{example}`
pub const DEFAULT_ENRICHMENT_PROMPT: &str = r#"You are processing {count} knowledge terms.
The knowledge terms in this batch are:
{items}

Analyze each knowledge term above and provide complete learning suggestions. For every term, cover the following:
{fields}

Reply with one JSON object per knowledge term, in the same order as the terms are listed, using exactly the keys shown. Separate consecutive JSON objects with this delimiter line:
{delimiter}
For example:
{example}"#;

/// Composes batch prompts with a fixed delimiter and template.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    delimiter: String,
    template: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            template: DEFAULT_ENRICHMENT_PROMPT.to_string(),
        }
    }
}

impl PromptComposer {
    /// Creates a composer using the default template.
    ///
    /// An empty delimiter is rejected, since splitting on it would be meaningless.
    pub fn new(delimiter: impl Into<String>) -> Result<Self, BatchError> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(BatchError::EmptyDelimiter);
        }
        Ok(Self {
            delimiter,
            ..Self::default()
        })
    }

    /// Replaces the instruction template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Builds the prompt for one batch. Pure; never touches the network.
    pub fn compose(&self, items: &[WorkItem]) -> String {
        let delimiter = &self.delimiter;
        let listed = items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {item}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");

        let instructions = self
            .template
            .replace("{count}", &items.len().to_string())
            .replace("{items}", &listed)
            .replace("{fields}", &field_instructions())
            .replace("{delimiter}", delimiter)
            .replace("{example}", &example_reply(delimiter));

        let batch_text = items
            .iter()
            .map(WorkItem::as_str)
            .collect::<Vec<_>>()
            .join(&format!("\n{delimiter}\n"));

        format!("{instructions}\n\n{batch_text}")
    }
}

/// Builds a batch prompt with the default template.
pub fn compose_batch_prompt(items: &[WorkItem], delimiter: &str) -> String {
    PromptComposer {
        delimiter: delimiter.to_string(),
        template: DEFAULT_ENRICHMENT_PROMPT.to_string(),
    }
    .compose(items)
}

fn field_instructions() -> String {
    ResultField::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| format!("  {}. \"{}\": {};", i + 1, field.key(), field.instruction()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn example_reply(delimiter: &str) -> String {
    let mut object = Map::new();
    for field in ResultField::ALL {
        let value = match field {
            ResultField::ConceptQuestions => Value::from(vec!["Question 1", "Question 2", "Question 3"]),
            _ => Value::from("..."),
        };
        object.insert(field.key().to_string(), value);
    }
    let pretty = serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_default();
    format!("```json\n{pretty}\n{delimiter}\n{{...}}\n```")
}
