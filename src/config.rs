//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.cyclecheck.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".cyclecheck.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis program settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Input staging settings.
    #[serde(default)]
    pub staging: StagingConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of batch items analyzed at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    1
}

/// External analysis program settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Program to execute.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the staged input path.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Working directory for the program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Per-invocation timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Record analyzed when no input is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_input: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            working_dir: None,
            timeout_seconds: None,
            default_input: None,
        }
    }
}

fn default_program() -> String {
    "python3".to_string()
}

fn default_args() -> Vec<String> {
    vec!["checker/checek.py".to_string()]
}

/// Temporary file settings for staged inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory for staged files (system temp directory if unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,

    /// File name prefix for staged files.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Pretty-print structured data when staging.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            prefix: default_prefix(),
            pretty: true,
        }
    }
}

fn default_prefix() -> String {
    "cyclecheck-".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their environment variables) take precedence over
    /// config file settings, but only when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref program) = args.program {
            self.analyzer.program = program.clone();
        }
        if let Some(ref program_args) = args.program_args {
            self.analyzer.args = program_args.clone();
        }
        if let Some(timeout) = args.timeout {
            self.analyzer.timeout_seconds = Some(timeout);
        }
        if let Some(ref default_input) = args.default_input {
            self.analyzer.default_input = Some(default_input.clone());
        }
        if let Some(ref temp_dir) = args.temp_dir {
            self.staging.temp_dir = Some(temp_dir.clone());
        }
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Reject values that would make every invocation fail.
    ///
    /// Run after [`Config::merge_with_args`] so file values get the same
    /// checks as flags.
    pub fn validate(&self) -> Result<()> {
        if self.general.concurrency == 0 {
            bail!("general.concurrency must be at least 1");
        }
        if self.analyzer.timeout_seconds == Some(0) {
            bail!("analyzer.timeout_seconds must be at least 1 second");
        }
        if self.analyzer.program.trim().is_empty() {
            bail!("analyzer.program must not be empty");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
