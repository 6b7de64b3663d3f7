//! cyclecheck - battery-cycler record checker shim
//!
//! Runs the configured analysis program on one or more JSON test records
//! and prints the JSON verdicts it returns.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, staging, program failure, unparseable output)
//!   2 - Batch finished with failed items and --fail-on-error was set

use anyhow::{Context, Result};
use chrono::Utc;
use cyclecheck::batch::{self, BatchOptions};
use cyclecheck::cli::{Args, Mode, OutputFormat};
use cyclecheck::config::{Config, CONFIG_FILE_NAME};
use cyclecheck::models::ReportMetadata;
use cyclecheck::{report, scanner, Analyzer, ProcessRunner};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration first so its verbosity applies to logging
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    debug!("cyclecheck v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .cyclecheck.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the analysis program, timeout, and default input.");
    Ok(())
}

/// Initialize logging at the given level.
///
/// Logs go to stderr so stdout carries only JSON or report output.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the requested operation. Returns exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    debug!("Configuration: {:?}", config);

    let analyzer = Analyzer::from_config(&config);
    info!("Analysis program: {}", analyzer.runner().program());

    match args.mode() {
        Mode::Default => {
            let result = analyzer.analyze_default().await?;
            emit_result(&args, &result)
        }
        Mode::Text(text) => {
            let result = analyzer.analyze_text(text).await?;
            emit_result(&args, &result)
        }
        Mode::Stdin => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read standard input")?;
            let result = analyzer.analyze_text(text).await?;
            emit_result(&args, &result)
        }
        Mode::Single(path) => {
            let result = analyzer.analyze_file(&path).await?;
            emit_result(&args, &result)
        }
        Mode::Batch(paths) => run_batch(&args, &config, &analyzer, &paths).await,
    }
}

/// Analyze several inputs and render the batch report.
async fn run_batch(
    args: &Args,
    config: &Config,
    analyzer: &Analyzer,
    paths: &[PathBuf],
) -> Result<i32> {
    let start_time = Instant::now();

    let inputs = scanner::collect_inputs(paths, args.recursive);
    if inputs.is_empty() {
        warn!("No JSON inputs found");
    }

    let options = BatchOptions {
        concurrency: config.general.concurrency,
        show_progress: !args.quiet && inputs.len() > 1,
    };
    let batch_report = batch::run_batch(analyzer, &inputs, &options).await;

    let metadata = ReportMetadata {
        program: analyzer.runner().program().to_string(),
        generated_at: Utc::now(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
        summary: batch_report.summary(),
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&batch_report, &metadata)?,
        OutputFormat::Markdown => report::generate_markdown_report(&batch_report, &metadata),
    };
    emit(args, &output)?;

    let summary = metadata.summary;
    info!(
        "{} inputs: {} succeeded, {} failed ({:.1}s)",
        summary.total, summary.succeeded, summary.failed, metadata.duration_seconds
    );

    if args.fail_on_error && batch_report.has_failures() {
        eprintln!(
            "\n⛔ {} of {} inputs failed. Failing (exit code 2).",
            summary.failed, summary.total
        );
        return Ok(2);
    }

    Ok(0)
}

/// Print (or save) a single analysis result.
fn emit_result(args: &Args, result: &Value) -> Result<i32> {
    let output = serde_json::to_string_pretty(result)?;
    emit(args, &output)?;
    Ok(0)
}

fn emit(args: &Args, content: &str) -> Result<()> {
    match args.output {
        Some(ref path) => {
            report::write_report(content, path)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output saved to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// Runs before logging is set up, so problems are reported on stderr directly.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        // Try explicit config path
        Some(ref config_path) => Config::load(config_path)?,
        // Try default location
        None => match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!(
                    "⚠️  Failed to load {}: {:#}. Using defaults.",
                    CONFIG_FILE_NAME, e
                );
                Config::default()
            }
        },
    };

    config.merge_with_args(args);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
