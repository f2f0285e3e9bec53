use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckboxState {
    Checked,
    Empty,
    Ambiguous,
}

/// Outcome of classifying one checkbox region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub state: CheckboxState,
    pub pixel_density: f32,
    pub confidence: f32,
}

impl Classification {
    /// The result every processing failure collapses to: a degenerate or
    /// unreadable region tells us nothing, so it is ambiguous with zero
    /// confidence.
    pub fn degraded() -> Self {
        Self {
            state: CheckboxState::Ambiguous,
            pixel_density: 0.0,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Itemized penalty diagnostics behind a document score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PenaltyBreakdown {
    pub missing_critical: Vec<String>,
    pub missing_important: Vec<String>,
    pub invalid_formats: Vec<String>,
    pub empty_valuations: Vec<String>,
    pub inconsistencies: Vec<String>,
}

impl PenaltyBreakdown {
    pub fn is_clean(&self) -> bool {
        self.missing_critical.is_empty()
            && self.missing_important.is_empty()
            && self.invalid_formats.is_empty()
            && self.empty_valuations.is_empty()
            && self.inconsistencies.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceReport {
    /// 0-1, rounded to two decimals.
    pub score: f32,
    pub percentage: u32,
    pub level: ConfidenceLevel,
    /// Declared fields that carried a usable value.
    pub extracted_count: usize,
    pub breakdown: PenaltyBreakdown,
    pub recommendation: String,
}

/// Field-name -> value map for one document. Values are kept as strings;
/// numeric JSON inputs are stringified at the boundary. Unknown fields are
/// carried but ignored by the scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentFieldMap(BTreeMap<String, String>);

impl DocumentFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Absent, or present but empty after trimming.
    pub fn is_blank(&self, name: &str) -> bool {
        match self.get(name) {
            Some(value) => value.trim().is_empty(),
            None => true,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Accept a loosely-typed JSON object: string, number, and bool values
    /// are stringified, nulls are treated as absent.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(entries) = value else {
            bail!("field map must be a JSON object");
        };

        let mut fields = Self::new();
        for (name, value) in entries {
            match value {
                serde_json::Value::Null => {}
                serde_json::Value::String(s) => fields.insert(name, s.clone()),
                serde_json::Value::Number(n) => fields.insert(name, n.to_string()),
                serde_json::Value::Bool(b) => fields.insert(name, b.to_string()),
                other => bail!("field {name:?} has unsupported value: {other}"),
            }
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blankness_covers_absent_and_whitespace() {
        let mut fields = DocumentFieldMap::new();
        fields.insert("a", "value");
        fields.insert("b", "   ");

        assert!(!fields.is_blank("a"));
        assert!(fields.is_blank("b"));
        assert!(fields.is_blank("missing"));
    }

    #[test]
    fn from_json_stringifies_scalars_and_drops_nulls() {
        let value = serde_json::json!({
            "age": 42,
            "name": "Acme",
            "active": true,
            "gone": null,
        });
        let fields = DocumentFieldMap::from_json(&value).unwrap();

        assert_eq!(fields.get("age"), Some("42"));
        assert_eq!(fields.get("name"), Some("Acme"));
        assert_eq!(fields.get("active"), Some("true"));
        assert_eq!(fields.get("gone"), None);
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn from_json_rejects_nested_values() {
        let value = serde_json::json!({ "nested": { "x": 1 } });
        assert!(DocumentFieldMap::from_json(&value).is_err());
    }
}
