use serde::{Deserialize, Serialize};

use crate::core::model::DocumentFieldMap;

/// Values a `blank` condition accepts besides absence and whitespace.
const BLANK_SENTINELS: &[&str] = &["NA", "NC"];

/// Predicate over a single field. Comparisons are case-insensitive over
/// the trimmed value; an absent field satisfies only `blank`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Equals { field: String, value: String },
    Contains { field: String, value: String },
    Blank { field: String },
}

impl Condition {
    pub fn holds(&self, fields: &DocumentFieldMap) -> bool {
        match self {
            Condition::Equals { field, value } => fields
                .get(field)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(value.trim())),
            Condition::Contains { field, value } => fields.get(field).is_some_and(|v| {
                v.trim()
                    .to_lowercase()
                    .contains(&value.trim().to_lowercase())
            }),
            Condition::Blank { field } => match fields.get(field) {
                None => true,
                Some(v) => {
                    let v = v.trim();
                    v.is_empty() || BLANK_SENTINELS.iter().any(|s| v.eq_ignore_ascii_case(s))
                }
            },
        }
    }
}

/// Cross-field consistency rule: when `when` holds, every `then` condition
/// must hold too. Violations are recorded by name, never raised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsistencyRule {
    pub name: String,
    pub when: Condition,
    pub then: Vec<Condition>,
}

impl ConsistencyRule {
    pub fn violated(&self, fields: &DocumentFieldMap) -> bool {
        self.when.holds(fields) && self.then.iter().any(|c| !c.holds(fields))
    }
}
