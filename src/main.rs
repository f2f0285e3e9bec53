use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use markscan::export::{Exporter, JsonExporter, TextExporter};
use markscan::pipeline::{analyze_document, score_fields, PipelineConfig};
use markscan::FormTemplate;

#[derive(Parser, Debug)]
#[command(name = "markscan")]
#[command(version, about = "Checkbox extraction and confidence scoring for scanned forms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one document: page images + template -> report
    Analyze {
        /// Page image files in page order, or a single directory of pages
        pages: Vec<PathBuf>,

        /// Form template JSON (checkbox groups and coordinates)
        #[arg(short, long)]
        template: PathBuf,

        /// Scoring configuration JSON (tiers, validators, rules)
        #[arg(short, long)]
        scoring: PathBuf,

        /// Field map JSON from the alternate extraction path
        #[arg(long)]
        external: Option<PathBuf>,

        /// Output directory (default: ./<first_page_stem>_report)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Analyze multiple documents, one directory of page images each
    Batch {
        /// Document directories
        inputs: Vec<PathBuf>,

        /// Form template JSON
        #[arg(short, long)]
        template: PathBuf,

        /// Scoring configuration JSON
        #[arg(short, long)]
        scoring: PathBuf,

        /// Output directory for all results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score an already-extracted field map (no images)
    Score {
        /// Field map JSON
        fields: PathBuf,

        /// Scoring configuration JSON
        #[arg(short, long)]
        scoring: PathBuf,
    },

    /// Show information about a form template
    Inspect {
        /// Form template JSON
        template: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("markscan=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            pages,
            template,
            scoring,
            external,
            output,
            quiet,
        } => analyze_single(pages, template, scoring, external, output, quiet),
        Commands::Batch {
            inputs,
            template,
            scoring,
            output,
        } => analyze_batch(inputs, template, scoring, output),
        Commands::Score { fields, scoring } => show_score(fields, scoring),
        Commands::Inspect { template } => inspect_template(template),
    }
}

fn analyze_single(
    pages: Vec<PathBuf>,
    template: PathBuf,
    scoring: PathBuf,
    external: Option<PathBuf>,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let pages = expand_pages(pages)?;
    if pages.is_empty() {
        anyhow::bail!("no page images specified");
    }

    let output_dir = output.unwrap_or_else(|| {
        let stem = pages[0]
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        PathBuf::from(format!("{stem}_report"))
    });

    if !quiet {
        println!("[*] Pages: {}", pages.len());
        println!("[*] Template: {}", template.display());
        println!("[*] Output: {}", output_dir.display());
    }

    let config = PipelineConfig {
        pages,
        template,
        scoring,
        external_fields: external,
        output: output_dir.clone(),
    };

    let run = analyze_document(&config)
        .with_context(|| "failed to analyze document".to_string())?;

    JsonExporter::new(output_dir.clone()).export(&run)?;
    TextExporter::new(output_dir.clone()).export(&run)?;

    if !quiet {
        println!(
            "\n[✓] Score: {:.2} ({:?}) — {} field(s) need review",
            run.report.score,
            run.report.level,
            run.needs_review.len()
        );
        println!("[✓] Results saved to: {}", output_dir.display());
    }

    Ok(())
}

fn analyze_batch(
    inputs: Vec<PathBuf>,
    template: PathBuf,
    scoring: PathBuf,
    output: Option<PathBuf>,
) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("no input directories specified");
    }

    let base_output = output.unwrap_or_else(|| PathBuf::from("batch_report"));

    println!("[*] Batch processing {} document(s)", inputs.len());
    println!("[*] Base output: {}\n", base_output.display());

    let mut success = 0;
    let mut failed = 0;

    for (i, input) in inputs.iter().enumerate() {
        println!("[{}/{}] Processing: {}", i + 1, inputs.len(), input.display());

        if !input.is_dir() {
            eprintln!("  [!] Skipped: not a directory");
            failed += 1;
            continue;
        }

        let stem = input
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("doc_{i}"));
        let output_dir = base_output.join(stem);

        match analyze_single(
            vec![input.clone()],
            template.clone(),
            scoring.clone(),
            None,
            Some(output_dir),
            true,
        ) {
            Ok(_) => {
                println!("  [✓] Success");
                success += 1;
            }
            Err(e) => {
                eprintln!("  [✗] Failed: {e}");
                failed += 1;
            }
        }
    }

    println!("\n[*] Summary: {success} succeeded, {failed} failed");

    if failed > 0 {
        anyhow::bail!("{failed} document(s) failed to process");
    }

    Ok(())
}

fn show_score(fields: PathBuf, scoring: PathBuf) -> Result<()> {
    let report = score_fields(&fields, &scoring)?;

    println!("Score: {:.2} ({}%)", report.score, report.percentage);
    println!("Level: {:?}", report.level);
    println!("Extracted fields: {}", report.extracted_count);
    println!("Recommendation: {}", report.recommendation);

    let breakdown = &report.breakdown;
    if !breakdown.is_clean() {
        println!();
        for (label, items) in [
            ("Missing critical", &breakdown.missing_critical),
            ("Missing important", &breakdown.missing_important),
            ("Invalid formats", &breakdown.invalid_formats),
            ("Empty valuations", &breakdown.empty_valuations),
            ("Inconsistencies", &breakdown.inconsistencies),
        ] {
            if !items.is_empty() {
                println!("{label}: {}", items.join(", "));
            }
        }
    }

    Ok(())
}

fn inspect_template(template: PathBuf) -> Result<()> {
    let template = FormTemplate::load(&template)?;

    println!("Template: {}", template.name);
    println!("Pages: {}", template.page_count());
    println!("Groups: {}", template.groups.len());
    println!();

    for group in &template.groups {
        println!(
            "  {:<28} page {} {:?} ({} options, sentinel {:?})",
            group.field,
            group.page,
            group.policy,
            group.options.len(),
            group.sentinel
        );
    }

    Ok(())
}

/// A single directory argument expands to its image files in name order.
fn expand_pages(pages: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    if pages.len() != 1 || !pages[0].is_dir() {
        return Ok(pages);
    }

    let dir = &pages[0];
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read page directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("png" | "jpg" | "jpeg")
            )
        })
        .collect();
    found.sort();

    if found.is_empty() {
        anyhow::bail!("no page images found in: {}", dir.display());
    }
    Ok(found)
}
