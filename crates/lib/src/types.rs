//! # Core Data Types
//!
//! Work items flow in, result records flow out. A [`ResultRecord`] always
//! carries every [`ResultField`]; anything the model omitted is filled with
//! the field's default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

static ABSENT: Value = Value::Null;

/// One knowledge term taken from an input row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(String);

impl WorkItem {
    /// Creates a work item, trimming surrounding whitespace.
    pub fn new(term: impl AsRef<str>) -> Self {
        Self(term.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkItem {
    fn from(term: &str) -> Self {
        Self::new(term)
    }
}

/// The closed set of fields every result record must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultField {
    Definition,
    ExtendedSuggestions,
    PracticalApplication,
    ExternalResources,
    ConceptQuestions,
}

impl ResultField {
    /// All fields, in output column order.
    pub const ALL: [ResultField; 5] = [
        ResultField::Definition,
        ResultField::ExtendedSuggestions,
        ResultField::PracticalApplication,
        ResultField::ExternalResources,
        ResultField::ConceptQuestions,
    ];

    /// The JSON key (and output column name) for this field.
    pub fn key(self) -> &'static str {
        match self {
            ResultField::Definition => "definition",
            ResultField::ExtendedSuggestions => "extended suggestions",
            ResultField::PracticalApplication => "practical application",
            ResultField::ExternalResources => "external resources",
            ResultField::ConceptQuestions => "concept questions",
        }
    }

    /// A one-line instruction describing what the model should put in this field.
    pub fn instruction(self) -> &'static str {
        match self {
            ResultField::Definition => "a clear definition and explanation of the term",
            ResultField::ExtendedSuggestions => {
                "related knowledge or fields worth studying next"
            }
            ResultField::PracticalApplication => {
                "how the knowledge is applied in real life, with a concrete example"
            }
            ResultField::ExternalResources => {
                "up-to-date external information or learning resources about the term"
            }
            ResultField::ConceptQuestions => {
                "3-5 simple concept-check questions (multiple choice or short answer)"
            }
        }
    }

    /// The value used when the model did not supply this field.
    pub fn default_value(self) -> Value {
        match self {
            ResultField::ConceptQuestions => Value::Array(Vec::new()),
            _ => Value::String(String::new()),
        }
    }

    /// Looks a field up by its JSON key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for ResultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The normalized structured output for one work item.
///
/// Unknown keys produced by the model are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ResultRecord(Map<String, Value>);

impl ResultRecord {
    /// Builds a record from a decoded JSON object, filling absent or `null`
    /// required fields with their defaults.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        for field in ResultField::ALL {
            let missing = matches!(map.get(field.key()), None | Some(Value::Null));
            if missing {
                map.insert(field.key().to_string(), field.default_value());
            }
        }
        Self(map)
    }

    /// Returns `count` records made entirely of defaults.
    pub fn defaults(count: usize) -> Vec<Self> {
        vec![Self::default(); count]
    }

    /// `true` when every required field still holds its default and no
    /// extra fields are present.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn get(&self, field: ResultField) -> &Value {
        self.0.get(field.key()).unwrap_or(&ABSENT)
    }

    /// Returns the field as text when it holds a JSON string.
    pub fn text(&self, field: ResultField) -> Option<&str> {
        self.get(field).as_str()
    }

    /// Returns the string entries of the concept-questions field.
    pub fn concept_questions(&self) -> Vec<&str> {
        self.get(ResultField::ConceptQuestions)
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Iterates over keys that are not part of the required field set.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0
            .iter()
            .filter(|(key, _)| ResultField::from_key(key).is_none())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Compact JSON encoding of the whole record.
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Renders a field for a table cell: strings verbatim, anything else as
    /// compact JSON.
    pub fn cell_value(&self, field: ResultField) -> String {
        match self.get(field) {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl Default for ResultRecord {
    fn default() -> Self {
        Self::from_map(Map::new())
    }
}

impl From<Map<String, Value>> for ResultRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

impl From<ResultRecord> for Map<String, Value> {
    fn from(record: ResultRecord) -> Self {
        record.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_record_has_every_field() {
        let record = ResultRecord::default();
        for field in ResultField::ALL {
            assert_eq!(record.get(field), &field.default_value());
        }
        assert_eq!(record.as_map().len(), ResultField::ALL.len());
        assert!(record.concept_questions().is_empty());
    }

    #[test]
    fn test_null_fields_count_as_absent() {
        let map = json!({"definition": null, "extra": 1})
            .as_object()
            .cloned()
            .unwrap();
        let record = ResultRecord::from_map(map);
        assert_eq!(record.text(ResultField::Definition), Some(""));
        assert_eq!(record.extra_fields().count(), 1);
    }

    #[test]
    fn test_cell_value_encodes_non_strings_as_json() {
        let map = json!({"definition": "x", "concept questions": ["a", "b"]})
            .as_object()
            .cloned()
            .unwrap();
        let record = ResultRecord::from_map(map);
        assert_eq!(record.cell_value(ResultField::Definition), "x");
        assert_eq!(
            record.cell_value(ResultField::ConceptQuestions),
            r#"["a","b"]"#
        );
    }

    #[test]
    fn test_work_item_trims_whitespace() {
        assert_eq!(WorkItem::new("  Ohm's law \n").as_str(), "Ohm's law");
    }
}
