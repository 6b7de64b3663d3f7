//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// cyclecheck - run a battery-cycler record checker and collect its verdict
///
/// Stages JSON test records for an external analysis program, runs it,
/// and prints the JSON it returns. Several inputs (or a directory) run as
/// a batch with one outcome per input.
///
/// Examples:
///   cyclecheck record.json
///   cyclecheck results/ --format markdown -o report.md
///   cyclecheck a.json b.json --concurrency 4 --fail-on-error
///   cyclecheck --text '{"data":{"step":[],"auxDBC":[]}}'
///   cat record.json | cyclecheck --stdin
///   cyclecheck --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// JSON record files or directories to analyze
    ///
    /// One file prints the analysis result. Several inputs or a directory
    /// produce a batch report. With no inputs, the configured default
    /// input is analyzed.
    #[arg(value_name = "INPUT", conflicts_with_all = ["text", "stdin"])]
    pub inputs: Vec<PathBuf>,

    /// Analyze raw JSON text instead of a file
    #[arg(long, value_name = "JSON", conflicts_with = "stdin")]
    pub text: Option<String>,

    /// Read raw JSON text from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Analysis program to execute
    #[arg(short, long, value_name = "PROGRAM", env = "CYCLECHECK_PROGRAM")]
    pub program: Option<String>,

    /// Argument passed to the program before the input path (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub program_args: Option<Vec<String>>,

    /// Per-invocation timeout in seconds (no timeout by default)
    #[arg(long, value_name = "SECS", env = "CYCLECHECK_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Record analyzed when no input is given
    #[arg(long, value_name = "FILE", env = "CYCLECHECK_DEFAULT_INPUT")]
    pub default_input: Option<PathBuf>,

    /// Directory for staged temporary files
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Number of batch items analyzed at once
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Descend into subdirectories when expanding directory inputs
    #[arg(short, long)]
    pub recursive: bool,

    /// Output file (stdout if not set)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Batch report format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Exit with code 2 if any batch item failed
    #[arg(long)]
    pub fail_on_error: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .cyclecheck.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .cyclecheck.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// Markdown format
    Markdown,
}

/// What the binary should do with the parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Analyze the configured default input.
    Default,
    /// Analyze JSON text given on the command line.
    Text(String),
    /// Analyze JSON text read from stdin.
    Stdin,
    /// Analyze a single file.
    Single(PathBuf),
    /// Analyze several inputs as a batch.
    Batch(Vec<PathBuf>),
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if let Some(ref program) = self.program {
            if program.trim().is_empty() {
                return Err("Program must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Decide which operation the arguments ask for.
    pub fn mode(&self) -> Mode {
        if let Some(ref text) = self.text {
            return Mode::Text(text.clone());
        }
        if self.stdin {
            return Mode::Stdin;
        }

        match self.inputs.as_slice() {
            [] => Mode::Default,
            [single] if !single.is_dir() => Mode::Single(single.clone()),
            inputs => Mode::Batch(inputs.to_vec()),
        }
    }

    /// Returns the log level based on verbosity settings.
    /// Log level from the flags, with `--quiet` winning over a verbose config.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn make_args() -> Args {
        Args {
            inputs: Vec::new(),
            text: None,
            stdin: false,
            program: None,
            program_args: None,
            timeout: None,
            default_input: None,
            temp_dir: None,
            concurrency: None,
            recursive: false,
            output: None,
            format: OutputFormat::Json,
            fail_on_error: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_inputs_and_flags() {
        let args = Args::try_parse_from([
            "cyclecheck",
            "a.json",
            "b.json",
            "--program",
            "checker",
            "--arg",
            "checker/checek.py",
            "--arg",
            "--strict",
            "--concurrency",
            "3",
            "--format",
            "markdown",
        ])
        .unwrap();

        assert_eq!(args.inputs, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(args.program.as_deref(), Some("checker"));
        assert_eq!(
            args.program_args,
            Some(vec!["checker/checek.py".to_string(), "--strict".to_string()])
        );
        assert_eq!(args.concurrency, Some(3));
        assert_eq!(args.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_text_conflicts_with_inputs() {
        let result = Args::try_parse_from(["cyclecheck", "a.json", "--text", "{}"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_selection() {
        let mut args = make_args();
        assert_eq!(args.mode(), Mode::Default);

        args.inputs = vec![PathBuf::from("/no/such/record.json")];
        assert_eq!(
            args.mode(),
            Mode::Single(PathBuf::from("/no/such/record.json"))
        );

        let dir = tempfile::TempDir::new().unwrap();
        args.inputs = vec![dir.path().to_path_buf()];
        assert_eq!(args.mode(), Mode::Batch(vec![dir.path().to_path_buf()]));

        args.inputs = vec![PathBuf::from("a.json"), PathBuf::from("b.json")];
        assert!(matches!(args.mode(), Mode::Batch(ref v) if v.len() == 2));

        args.inputs.clear();
        args.stdin = true;
        assert_eq!(args.mode(), Mode::Stdin);

        args.text = Some("{}".to_string());
        assert_eq!(args.mode(), Mode::Text("{}".to_string()));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.concurrency = Some(0);
        assert!(args.validate().is_err());

        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.analyzer.timeout_seconds = Some(60);

        let mut args = make_args();
        args.program = Some("/opt/checker".to_string());
        args.program_args = Some(vec![]);
        args.default_input = Some(PathBuf::from("/data/default.json"));
        args.concurrency = Some(2);

        config.merge_with_args(&args);

        assert_eq!(config.analyzer.program, "/opt/checker");
        assert!(config.analyzer.args.is_empty());
        assert_eq!(config.analyzer.timeout_seconds, Some(60));
        assert_eq!(
            config.analyzer.default_input,
            Some(PathBuf::from("/data/default.json"))
        );
        assert_eq!(config.general.concurrency, 2);
    }
}
