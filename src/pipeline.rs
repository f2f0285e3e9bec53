use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::model::{ConfidenceReport, DocumentFieldMap};
use crate::core::thresholds::ClassifierConfig;
use crate::raster::PageRaster;
use crate::resolve::{resolve_degraded, resolve_group, GroupResolution};
use crate::score::{score_document, ScoringConfig};
use crate::template::FormTemplate;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Page images in page order (index = page number in the template).
    pub pages: Vec<PathBuf>,
    pub template: PathBuf,
    pub scoring: PathBuf,
    /// Field map produced by the alternate extraction path, if any.
    pub external_fields: Option<PathBuf>,
    pub output: PathBuf,
}

/// Everything one document run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRun {
    pub template: String,
    pub resolutions: Vec<GroupResolution>,
    pub fields: DocumentFieldMap,
    pub needs_review: Vec<String>,
    pub report: ConfidenceReport,
}

pub fn analyze_document(config: &PipelineConfig) -> Result<DocumentRun> {
    let template = FormTemplate::load(&config.template)?;
    let scoring = ScoringConfig::load(&config.scoring)?;
    let classifier = template.classifier.clone().unwrap_or_default();

    // A page that fails to decode degrades its groups instead of aborting
    // the document.
    let pages: Vec<Option<PageRaster>> = config
        .pages
        .iter()
        .map(|path| match PageRaster::load(path) {
            Ok(raster) => Some(raster),
            Err(err) => {
                warn!(page = %path.display(), error = %err, "page decode failed, degrading");
                None
            }
        })
        .collect();

    // Alternate-path values land first; the deterministic checkbox path
    // overwrites any field both producers populate.
    let mut fields = match &config.external_fields {
        Some(path) => load_field_map(path)?,
        None => DocumentFieldMap::new(),
    };

    let mut resolutions = Vec::with_capacity(template.groups.len());
    for group in &template.groups {
        let resolution = match pages.get(group.page).and_then(Option::as_ref) {
            Some(page) => resolve_group(page, group, &classifier),
            None => resolve_degraded(group),
        };
        if let Some(value) = resolution.field_value() {
            fields.insert(group.field.clone(), value);
        }
        resolutions.push(resolution);
    }

    let needs_review: Vec<String> = resolutions
        .iter()
        .filter(|r| r.needs_human_review)
        .map(|r| r.field.clone())
        .collect();

    let report = score_document(&fields, &scoring);

    info!(
        template = %template.name,
        groups = resolutions.len(),
        score = report.score,
        review = needs_review.len(),
        "document analyzed"
    );

    Ok(DocumentRun {
        template: template.name,
        resolutions,
        fields,
        needs_review,
        report,
    })
}

/// Aggregator-only entry point: score an already-populated field map.
pub fn score_fields(fields_path: &Path, scoring_path: &Path) -> Result<ConfidenceReport> {
    let fields = load_field_map(fields_path)?;
    let scoring = ScoringConfig::load(scoring_path)?;
    Ok(score_document(&fields, &scoring))
}

fn load_field_map(path: &Path) -> Result<DocumentFieldMap> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read field map: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse field map JSON: {}", path.display()))?;
    DocumentFieldMap::from_json(&value)
}
