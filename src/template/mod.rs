use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::geometry::NormalizedBox;
use crate::core::thresholds::ClassifierConfig;

pub const DEFAULT_SENTINEL: &str = "NC";

/// How a group's classifications map onto an answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupPolicy {
    /// Ordinal code set (e.g. "NC", "1".."4"); the answer is one code.
    Scale,
    /// Independent (value, code) pairs; the answer is a pair or nulls.
    Labeled,
    /// Exactly two options; the answer is a tri-state value.
    Binary,
}

/// One answer option inside a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupOption {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "box")]
    pub region: NormalizedBox,
}

/// A set of mutually exclusive checkboxes answering one logical question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldGroup {
    /// Field name this group populates in the document map.
    pub field: String,
    /// Page index the regions live on (0-based).
    #[serde(default)]
    pub page: usize,
    pub policy: GroupPolicy,
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    pub options: Vec<GroupOption>,
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

/// Read-only layout configuration supplied by the template collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormTemplate {
    pub name: String,
    /// Optional per-template classifier overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<ClassifierConfig>,
    pub groups: Vec<FieldGroup>,
}

impl FormTemplate {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read template: {}", path.display()))?;
        let template: FormTemplate = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse template JSON: {}", path.display()))?;
        template.validate()?;
        Ok(template)
    }

    /// Boundary validation; the engine itself assumes a well-formed template.
    pub fn validate(&self) -> Result<()> {
        for group in &self.groups {
            if group.options.is_empty() {
                bail!("group {:?} has no options", group.field);
            }
            if group.policy == GroupPolicy::Binary && group.options.len() != 2 {
                bail!(
                    "binary group {:?} must have exactly 2 options, found {}",
                    group.field,
                    group.options.len()
                );
            }
        }
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.page + 1)
            .max()
            .unwrap_or(0)
    }
}
