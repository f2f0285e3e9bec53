pub mod rules;
pub mod schema;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::model::{ConfidenceLevel, ConfidenceReport, DocumentFieldMap, PenaltyBreakdown};

pub use rules::{Condition, ConsistencyRule};
pub use schema::{FormatValidator, Tier};

// Penalty weights of the scoring model.
const MISSING_CRITICAL_PENALTY: f32 = 0.15;
const MISSING_IMPORTANT_PENALTY: f32 = 0.05;
const INVALID_FORMAT_PENALTY: f32 = 0.03;
const EMPTY_VALUATION_PENALTY: f32 = 0.02;
const INCONSISTENCY_PENALTY: f32 = 0.05;

const HIGH_CUTOFF: f32 = 0.85;
const MEDIUM_CUTOFF: f32 = 0.65;

/// Declared scoring configuration: schema of tiers, format validators,
/// ordinal-valuation fields, categorical code sets, and consistency rules.
/// Entirely external, swappable data; nothing form-specific lives in code.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub schema: BTreeMap<String, Tier>,
    pub validators: BTreeMap<String, FormatValidator>,
    pub valuation_fields: Vec<String>,
    pub code_fields: BTreeMap<String, Vec<String>>,
    pub rules: Vec<ConsistencyRule>,
}

impl ScoringConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read scoring config: {}", path.display()))?;
        let config: ScoringConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse scoring config JSON: {}", path.display()))?;
        for (field, validator) in &config.validators {
            validator
                .check_well_formed()
                .with_context(|| format!("invalid validator pattern for field {field:?}"))?;
        }
        Ok(config)
    }
}

/// Score a document's extracted field map against the declared config.
///
/// Pure and total: garbage input scores low with full diagnostics instead
/// of failing. The score never increases as penalties accumulate.
pub fn score_document(fields: &DocumentFieldMap, config: &ScoringConfig) -> ConfidenceReport {
    let mut penalty: f32 = 0.0;
    let mut extracted_count: usize = 0;
    let mut breakdown = PenaltyBreakdown::default();

    for (name, tier) in &config.schema {
        match tier {
            Tier::Critical | Tier::Important => {
                if fields.is_blank(name) {
                    if *tier == Tier::Critical {
                        penalty += MISSING_CRITICAL_PENALTY;
                        breakdown.missing_critical.push(name.clone());
                    } else {
                        penalty += MISSING_IMPORTANT_PENALTY;
                        breakdown.missing_important.push(name.clone());
                    }
                } else {
                    extracted_count += 1;
                    // Present but malformed: both counted and penalized.
                    if let Some(validator) = config.validators.get(name) {
                        let value = fields.get(name).unwrap_or_default();
                        if !validator.accepts(value) {
                            penalty += INVALID_FORMAT_PENALTY;
                            breakdown.invalid_formats.push(name.clone());
                        }
                    }
                }
            }
            Tier::Other => {
                if !fields.is_blank(name) {
                    extracted_count += 1;
                }
            }
        }
    }

    for name in &config.valuation_fields {
        let valid = fields
            .get(name)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .is_some_and(|n| (1..=4).contains(&n));
        if valid {
            extracted_count += 1;
        } else {
            penalty += EMPTY_VALUATION_PENALTY;
            breakdown.empty_valuations.push(name.clone());
        }
    }

    for (name, allowed) in &config.code_fields {
        if let Some(value) = fields.get(name) {
            let value = value.trim();
            if !value.is_empty() && !allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
                penalty += INVALID_FORMAT_PENALTY;
                breakdown.invalid_formats.push(name.clone());
            }
        }
    }

    for rule in &config.rules {
        if rule.violated(fields) {
            penalty += INCONSISTENCY_PENALTY;
            breakdown.inconsistencies.push(rule.name.clone());
        }
    }

    let raw_score = (1.0 - penalty).clamp(0.0, 1.0);
    let score = (raw_score * 100.0).round() / 100.0;
    let percentage = (score * 100.0).round() as u32;
    let level = if score >= HIGH_CUTOFF {
        ConfidenceLevel::High
    } else if score >= MEDIUM_CUTOFF {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };
    let recommendation = build_recommendation(level, &breakdown.missing_critical);

    debug!(score, percentage, ?level, "scored document");

    ConfidenceReport {
        score,
        percentage,
        level,
        extracted_count,
        breakdown,
        recommendation,
    }
}

fn build_recommendation(level: ConfidenceLevel, missing_critical: &[String]) -> String {
    let base = match level {
        ConfidenceLevel::High => "Extraction reliable - verification optional",
        ConfidenceLevel::Medium => "Verify important fields before approving",
        ConfidenceLevel::Low => "Review full document - low confidence",
    };

    if missing_critical.is_empty() {
        return base.to_string();
    }

    let named = missing_critical
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let suffix = if missing_critical.len() > 3 { ", ..." } else { "" };
    format!("{base} (missing critical: {named}{suffix})")
}
