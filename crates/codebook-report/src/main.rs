//! CLI entry point for codebook report generation.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use codebook_report::utils::truncate_str;
use codebook_report::{Bundle, ReportConfig, ReportGenerator, ReportObject, VariableStats};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Codebook report generator for survey bundles",
    long_about = "Computes per-variable statistics for a survey bundle and renders them \
                  into the study's codebook HTML template.\n\n\
                  EXAMPLES:\n  \
                  # Render next to the bundle using the study template\n  \
                  codebook-report data/wave1.json\n\n  \
                  # Use an explicit template\n  \
                  codebook-report data/wave1.json --template templates/codebook.html\n\n  \
                  # Preview the summary table\n  \
                  codebook-report data/wave1.json --dry-run\n\n  \
                  # Print the report JSON\n  \
                  codebook-report data/wave1.json --json"
)]
struct Args {
    /// Path to the bundle JSON file
    bundle_path: PathBuf,

    /// HTML template to render into
    ///
    /// If not specified, the template is looked up under the study root,
    /// found by searching upwards from the current directory for study.yaml
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Output file for the rendered report
    ///
    /// Defaults to <bundle stem>.<template file name> next to the bundle
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output the report JSON to stdout instead of rendering a template
    ///
    /// Disables all logs; only outputs the report.
    #[arg(long)]
    json: bool,

    /// Print the summary table without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Compute column statistics in parallel
    #[arg(long)]
    parallel: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !args.bundle_path.exists() {
        return Err(anyhow!(
            "Bundle file not found: {}",
            args.bundle_path.display()
        ));
    }

    let mut config_builder = ReportConfig::builder().parallel(args.parallel);
    if let Some(ref template) = args.template {
        config_builder = config_builder.template_path(template);
    }
    let config = config_builder.build()?;

    let bundle = Bundle::read_file(&args.bundle_path)?;
    info!(
        "Bundle loaded: {} columns, {} rows",
        bundle.columns.len(),
        bundle.dataset.height()
    );

    let report = ReportObject::encode(&bundle, &config)
        .with_context(|| format!("Failed to build report for '{}'", bundle.info.name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.dry_run {
        print_summary(&args.bundle_path, &report);
        return Ok(());
    }

    let generator = ReportGenerator::new(config);
    let written = match &args.output {
        Some(output_path) => {
            let template_path = generator
                .resolve_template_path(&env::current_dir()?)
                .context("Could not locate the codebook template; pass --template")?;
            debug!("Template: {}", template_path.display());
            generator.write_report_to(&report, &template_path, output_path)?
        }
        None => generator
            .write_report(&args.bundle_path, &report)
            .context("Could not write the codebook next to the bundle; pass --template")?,
    };
    info!("Codebook written to {}", written.display());

    Ok(())
}

/// Print the summary table of a report.
///
/// Uses `println!` so the table is shown regardless of log level.
fn print_summary(bundle_path: &Path, report: &ReportObject) {
    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Codebook summary");
    println!("{}\n", "=".repeat(80));

    println!("BUNDLE");
    println!("{}", "-".repeat(40));
    println!("  File: {}", bundle_path.display());
    println!("  Name: {}", report.bundle.name);
    if let Some(ref title) = report.bundle.title {
        println!("  Title: {}", title);
    }
    println!("  Variables: {}", report.tabledata.len());
    println!();

    println!("VARIABLES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<4} {:<24} {:<14} {:<10} {:>7} {:>7}  {}",
        "Id", "Name", "Type", "Group", "Valid", "Missing", "Details"
    );
    println!("{}", "-".repeat(80));

    for row in &report.tabledata {
        println!(
            "{:<4} {:<24} {:<14} {:<10} {:>7} {:>7}  {}",
            row.id,
            truncate_str(&row.name, 23),
            truncate_str(&row.display_type, 13),
            truncate_str(&row.group, 9),
            row.num_valid,
            row.num_missing,
            stats_detail(&row.stats)
        );
    }
    println!();

    println!("MISSING REASONS");
    println!("{}", "-".repeat(40));
    let mut any_missing = false;
    for row in report.tabledata.iter().filter(|r| r.num_missing > 0) {
        any_missing = true;
        let reasons: Vec<String> = row
            .missingness
            .iter()
            .map(|m| format!("{} {} ({})", m.label, m.count, m.pct))
            .collect();
        println!("  {}: {}", row.name, reasons.join(", "));
    }
    if !any_missing {
        println!("  No missing values");
    }

    println!("{}", "=".repeat(80));
    println!("To render the codebook, run without --dry-run");
    println!("{}", "=".repeat(80));
}

fn stats_detail(stats: &VariableStats) -> String {
    match stats {
        VariableStats::Text(_) => String::new(),
        VariableStats::Coded(coded) => format!("{} codes", coded.items.len()),
        VariableStats::Numeric(numeric) => match (numeric.min, numeric.max, numeric.mean) {
            (Some(min), Some(max), Some(mean)) => {
                format!("min {:.2}, max {:.2}, mean {:.2}", min, max, mean)
            }
            _ => "no observations".to_string(),
        },
    }
}
