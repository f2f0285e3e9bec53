use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::export::Exporter;
use crate::pipeline::DocumentRun;
use crate::resolve::GroupResolution;

/// Human-readable run summary for quick review queues.
#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn format_resolution(resolution: &GroupResolution) -> String {
        let answer = resolution.field_value().unwrap_or_else(|| "-".to_string());
        let flag = if resolution.needs_human_review {
            " [REVIEW]"
        } else {
            ""
        };
        format!(
            "{:<28} {:<12} conf {:.2}{}",
            resolution.field, answer, resolution.confidence, flag
        )
    }
}

impl Exporter for TextExporter {
    fn export(&self, run: &DocumentRun) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;

        let mut text = String::new();
        writeln!(text, "=== {} ===", run.template)?;
        writeln!(
            text,
            "score {:.2} ({}%) level {:?}",
            run.report.score, run.report.percentage, run.report.level
        )?;
        writeln!(text, "{}", run.report.recommendation)?;
        writeln!(text)?;

        for resolution in &run.resolutions {
            writeln!(text, "{}", Self::format_resolution(resolution))?;
        }

        let breakdown = &run.report.breakdown;
        if !breakdown.is_clean() {
            writeln!(text)?;
            if !breakdown.missing_critical.is_empty() {
                writeln!(text, "missing critical: {}", breakdown.missing_critical.join(", "))?;
            }
            if !breakdown.missing_important.is_empty() {
                writeln!(
                    text,
                    "missing important: {}",
                    breakdown.missing_important.join(", ")
                )?;
            }
            if !breakdown.invalid_formats.is_empty() {
                writeln!(text, "invalid formats: {}", breakdown.invalid_formats.join(", "))?;
            }
            if !breakdown.empty_valuations.is_empty() {
                writeln!(
                    text,
                    "empty valuations: {}",
                    breakdown.empty_valuations.join(", ")
                )?;
            }
            if !breakdown.inconsistencies.is_empty() {
                writeln!(text, "inconsistencies: {}", breakdown.inconsistencies.join(", "))?;
            }
        }

        fs::write(self.out_dir.join("summary.txt"), text)?;
        Ok(())
    }
}
