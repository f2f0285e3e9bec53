use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::classify_region;
use crate::core::model::{CheckboxState, Classification};
use crate::core::thresholds::ClassifierConfig;
use crate::raster::PageRaster;
use crate::template::{FieldGroup, GroupPolicy};

/// Per-option detail kept alongside a resolution for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionOutcome {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub classification: Classification,
}

/// One group collapsed to a single answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupResolution {
    pub field: String,
    pub policy: GroupPolicy,
    /// `None` for a labeled group without a determinable answer.
    pub selected_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_value: Option<String>,
    pub confidence: f32,
    pub needs_human_review: bool,
    pub options: Vec<OptionOutcome>,
}

impl GroupResolution {
    /// Value recorded in the document field map, `None` when the field
    /// stays absent (labeled group with no answer).
    pub fn field_value(&self) -> Option<String> {
        self.selected_value
            .clone()
            .or_else(|| self.selected_code.clone())
    }
}

/// Classify every option of a group and resolve the answer. Options are
/// independent, so classification fans out across the pool; resolution
/// waits for all of them.
pub fn resolve_group(
    page: &PageRaster,
    group: &FieldGroup,
    config: &ClassifierConfig,
) -> GroupResolution {
    let outcomes: Vec<OptionOutcome> = group
        .options
        .par_iter()
        .map(|option| OptionOutcome {
            code: option.code.clone(),
            value: option.value.clone(),
            classification: classify_region(page, &option.region, config),
        })
        .collect();

    resolve_classified(group, outcomes)
}

/// Resolve a group whose page could not be decoded: every option degrades
/// to ambiguous, which lands in the faint-mark branch below.
pub fn resolve_degraded(group: &FieldGroup) -> GroupResolution {
    let outcomes = group
        .options
        .iter()
        .map(|option| OptionOutcome {
            code: option.code.clone(),
            value: option.value.clone(),
            classification: Classification::degraded(),
        })
        .collect();
    resolve_classified(group, outcomes)
}

/// Pure resolution over already-computed classifications.
///
/// One clean mark wins with its classification confidence; multiple marks,
/// a faint mark, or a clean blank all select the group's no-answer sentinel
/// with fixed confidences.
pub fn resolve_classified(group: &FieldGroup, outcomes: Vec<OptionOutcome>) -> GroupResolution {
    let checked: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| o.classification.state == CheckboxState::Checked)
        .map(|(idx, _)| idx)
        .collect();
    let ambiguous_count = outcomes
        .iter()
        .filter(|o| o.classification.state == CheckboxState::Ambiguous)
        .count();

    let resolution = match checked.as_slice() {
        [winner] => {
            let (code, value, confidence) = {
                let winner = &outcomes[*winner];
                (
                    winner.code.clone(),
                    winner.value.clone(),
                    winner.classification.confidence,
                )
            };
            GroupResolution {
                field: group.field.clone(),
                policy: group.policy,
                selected_code: Some(code),
                selected_value: value,
                confidence,
                needs_human_review: false,
                options: outcomes,
            }
        }
        [] if ambiguous_count > 0 => no_answer(group, outcomes, 0.3, true),
        [] => no_answer(group, outcomes, 0.9, false),
        _ => {
            // Contradictory physical marks
            let confidence = match group.policy {
                GroupPolicy::Binary => 0.7,
                GroupPolicy::Scale | GroupPolicy::Labeled => 0.8,
            };
            no_answer(group, outcomes, confidence, true)
        }
    };

    debug!(
        field = %group.field,
        checked = checked.len(),
        ambiguous = ambiguous_count,
        selected = resolution.selected_code.as_deref().unwrap_or("-"),
        confidence = resolution.confidence,
        "resolved group"
    );
    resolution
}

fn no_answer(
    group: &FieldGroup,
    options: Vec<OptionOutcome>,
    confidence: f32,
    needs_human_review: bool,
) -> GroupResolution {
    let (selected_code, selected_value) = match group.policy {
        // Labeled groups answer with a pair of nulls; the field stays absent.
        GroupPolicy::Labeled => (None, None),
        // Scale groups answer with the sentinel code.
        GroupPolicy::Scale => (Some(group.sentinel.clone()), None),
        // Binary groups answer with the sentinel as the tri-state value.
        GroupPolicy::Binary => (None, Some(group.sentinel.clone())),
    };
    GroupResolution {
        field: group.field.clone(),
        policy: group.policy,
        selected_code,
        selected_value,
        confidence,
        needs_human_review,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::classify::classify_density;
    use crate::core::geometry::NormalizedBox;
    use crate::template::{GroupOption, DEFAULT_SENTINEL};

    fn scale_group(codes: &[&str]) -> FieldGroup {
        FieldGroup {
            field: "rating_1".into(),
            page: 0,
            policy: GroupPolicy::Scale,
            sentinel: DEFAULT_SENTINEL.into(),
            options: codes
                .iter()
                .map(|code| GroupOption {
                    code: (*code).into(),
                    value: None,
                    region: NormalizedBox::new(0.0, 0.1, 0.0, 0.1),
                })
                .collect(),
        }
    }

    fn outcomes_for(group: &FieldGroup, densities: &[f32]) -> Vec<OptionOutcome> {
        let config = ClassifierConfig::default();
        group
            .options
            .iter()
            .zip(densities)
            .map(|(option, density)| OptionOutcome {
                code: option.code.clone(),
                value: option.value.clone(),
                classification: classify_density(*density, &config),
            })
            .collect()
    }

    #[test]
    fn clean_single_mark_selects_that_option() {
        let group = scale_group(&["NC", "1", "2", "3", "4"]);
        let outcomes = outcomes_for(&group, &[0.01, 0.01, 0.01, 0.30, 0.01]);

        let resolution = resolve_classified(&group, outcomes);

        assert_eq!(resolution.selected_code.as_deref(), Some("3"));
        assert!(!resolution.needs_human_review);
        assert!((resolution.confidence - 0.474).abs() < 1e-3);
    }

    #[test]
    fn double_mark_falls_back_to_sentinel() {
        let group = scale_group(&["NC", "1", "2", "3", "4"]);
        let outcomes = outcomes_for(&group, &[0.01, 0.01, 0.20, 0.20, 0.01]);

        let resolution = resolve_classified(&group, outcomes);

        assert_eq!(resolution.selected_code.as_deref(), Some("NC"));
        assert_eq!(resolution.confidence, 0.8);
        assert!(resolution.needs_human_review);
    }

    #[test]
    fn clean_blank_is_confident_no_answer() {
        let group = scale_group(&["NC", "1", "2", "3", "4"]);
        let outcomes = outcomes_for(&group, &[0.01; 5]);

        let resolution = resolve_classified(&group, outcomes);

        assert_eq!(resolution.selected_code.as_deref(), Some("NC"));
        assert_eq!(resolution.confidence, 0.9);
        assert!(!resolution.needs_human_review);
    }

    #[test]
    fn faint_mark_requests_review() {
        let group = scale_group(&["NC", "1", "2", "3", "4"]);
        let outcomes = outcomes_for(&group, &[0.01, 0.06, 0.01, 0.01, 0.01]);

        let resolution = resolve_classified(&group, outcomes);

        assert_eq!(resolution.selected_code.as_deref(), Some("NC"));
        assert_eq!(resolution.confidence, 0.3);
        assert!(resolution.needs_human_review);
    }

    #[test]
    fn binary_conflict_uses_lower_confidence() {
        let group = FieldGroup {
            field: "recommend".into(),
            page: 0,
            policy: GroupPolicy::Binary,
            sentinel: DEFAULT_SENTINEL.into(),
            options: vec![
                GroupOption {
                    code: "Y".into(),
                    value: Some("Yes".into()),
                    region: NormalizedBox::new(0.0, 0.1, 0.0, 0.1),
                },
                GroupOption {
                    code: "N".into(),
                    value: Some("No".into()),
                    region: NormalizedBox::new(0.2, 0.3, 0.0, 0.1),
                },
            ],
        };
        let outcomes = outcomes_for(&group, &[0.3, 0.3]);

        let resolution = resolve_classified(&group, outcomes);

        assert_eq!(resolution.selected_value.as_deref(), Some("NC"));
        assert_eq!(resolution.selected_code, None);
        assert_eq!(resolution.confidence, 0.7);
        assert!(resolution.needs_human_review);
        assert_eq!(resolution.field_value().as_deref(), Some("NC"));
    }

    #[test]
    fn labeled_no_answer_leaves_field_absent() {
        let group = FieldGroup {
            field: "category".into(),
            page: 0,
            policy: GroupPolicy::Labeled,
            sentinel: DEFAULT_SENTINEL.into(),
            options: vec![
                GroupOption {
                    code: "1".into(),
                    value: Some("Manager".into()),
                    region: NormalizedBox::new(0.0, 0.1, 0.0, 0.1),
                },
                GroupOption {
                    code: "2".into(),
                    value: Some("Technician".into()),
                    region: NormalizedBox::new(0.2, 0.3, 0.0, 0.1),
                },
            ],
        };
        let outcomes = outcomes_for(&group, &[0.2, 0.2]);

        let resolution = resolve_classified(&group, outcomes);

        assert_eq!(resolution.selected_code, None);
        assert_eq!(resolution.selected_value, None);
        assert_eq!(resolution.field_value(), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let group = scale_group(&["NC", "1", "2", "3", "4"]);
        let outcomes = outcomes_for(&group, &[0.01, 0.01, 0.01, 0.30, 0.01]);

        let first = resolve_classified(&group, outcomes.clone());
        let second = resolve_classified(&group, outcomes);
        assert_eq!(first, second);
    }

    #[test]
    fn degraded_page_resolves_to_faint_mark_branch() {
        let group = scale_group(&["NC", "1", "2"]);
        let resolution = resolve_degraded(&group);

        assert_eq!(resolution.selected_code.as_deref(), Some("NC"));
        assert_eq!(resolution.confidence, 0.3);
        assert!(resolution.needs_human_review);
        assert!(resolution
            .options
            .iter()
            .all(|o| o.classification == Classification::degraded()));
    }
}
