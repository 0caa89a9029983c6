//! CLI entry point for the sales data cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use sales_cleaning::{EmptyColumnPolicy, Pipeline, PipelineConfig, PipelineResult};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Sales data cleaning pipeline",
    long_about = "Loads a delimited sales file, removes duplicate rows, imputes missing \
                  values, fixes column types, drops outliers and writes a cleaned copy.\n\n\
                  EXAMPLES:\n  \
                  # Defaults: sales_data.csv (cp1252) -> sales_data_cleaned_visuals.csv\n  \
                  sales-cleaning\n\n  \
                  # Custom paths, no charts\n  \
                  sales-cleaning -i data/sales.csv -o data/clean.csv --no-charts\n\n  \
                  # Column roles and other settings from a JSON file\n  \
                  sales-cleaning --config cleaning.json --json"
)]
struct Args {
    /// Path to the delimited input file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path of the cleaned output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text encoding of the input file (e.g. cp1252, latin1, utf-8)
    #[arg(short, long)]
    encoding: Option<String>,

    /// Text encoding of the output file
    #[arg(long)]
    output_encoding: Option<String>,

    /// Directory that receives the chart files
    #[arg(long)]
    charts_dir: Option<PathBuf>,

    /// Do not render any charts
    #[arg(long)]
    no_charts: bool,

    /// JSON configuration file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Leave entirely missing columns missing instead of failing
    #[arg(long)]
    allow_empty_columns: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON result.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
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

    let config = build_config(&args)?;
    let mut pipeline = build_pipeline(&args, config)?;

    match pipeline.run() {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_human_readable_summary(&result);
            }
            Ok(())
        }
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            error!("Pipeline failed: {}", e);
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

/// Merge the optional JSON configuration file with command line overrides.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let base = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let mut builder = PipelineConfig::builder()
        .input_path(&base.input_path)
        .output_path(&base.output_path)
        .input_encoding(&base.input_encoding)
        .output_encoding(&base.output_encoding)
        .delimiter(base.delimiter)
        .missing_markers(base.missing_markers.iter())
        .infer_schema_length(base.infer_schema_length)
        .columns(base.columns.clone())
        .outlier_sigma(base.outlier_sigma)
        .empty_column_policy(base.empty_column_policy)
        .render_charts(base.render_charts && !args.no_charts)
        .charts_dir(&base.charts_dir);

    if let Some(input) = &args.input {
        builder = builder.input_path(input);
    }
    if let Some(output) = &args.output {
        builder = builder.output_path(output);
    }
    if let Some(encoding) = &args.encoding {
        builder = builder.input_encoding(encoding);
    }
    if let Some(encoding) = &args.output_encoding {
        builder = builder.output_encoding(encoding);
    }
    if let Some(dir) = &args.charts_dir {
        builder = builder.charts_dir(dir);
    }
    if args.allow_empty_columns {
        builder = builder.empty_column_policy(EmptyColumnPolicy::LeaveMissing);
    }

    Ok(builder.build()?)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Print a human-readable summary of the cleaning results.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(result: &PipelineResult) {
    let summary = &result.summary;
    let before = &result.overview_before;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        result.input_file, before.rows, before.columns
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        result.output_file, result.overview_after.rows, result.overview_after.columns
    );
    println!();

    println!("Initial Dataset Info:");
    println!("{:<20} {:<16} {:>10} {:>10}", "Column", "Type", "Non-Null", "Missing");
    println!("{}", "-".repeat(60));
    for col in &before.column_overviews {
        println!(
            "{:<20} {:<16} {:>10} {:>10}",
            truncate_str(&col.name, 19),
            truncate_str(&col.dtype, 15),
            col.non_null_count,
            col.null_count
        );
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed)",
        summary.rows_loaded,
        summary.rows_after,
        summary.rows_removed()
    );
    println!("  Duplicate rows removed: {}", summary.duplicates_removed);
    if let Some(outliers) = &summary.outliers {
        match outliers.upper_bound {
            Some(bound) => println!(
                "  Outliers removed ({} > {:.2}): {}",
                outliers.column, bound, outliers.rows_removed
            ),
            None => println!(
                "  Outlier bound for {} undefined: {} rows removed",
                outliers.column, outliers.rows_removed
            ),
        }
    }
    println!(
        "  Missing values: {} -> {}",
        summary.missing_before, summary.missing_after
    );
    println!();

    if !summary.steps.is_empty() {
        println!("Actions Taken:");
        for step in &summary.steps {
            println!("  - {}", step);
        }
        println!();
    }

    if !summary.charts_rendered.is_empty() {
        println!("Charts:");
        for title in &summary.charts_rendered {
            println!("  * {}", title);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
