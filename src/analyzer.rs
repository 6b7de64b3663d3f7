//! Public analysis operations.
//!
//! [`Analyzer`] pairs a [`Stager`] with an [`Invoker`] and exposes the
//! single-item operations plus batch analysis over file paths.

use crate::batch::{self, BatchOptions};
use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::invoker::Invoker;
use crate::models::{AnalysisRequest, BatchReport};
use crate::runner::{CommandRunner, ProcessRunner};
use crate::stager::{Stager, StagingOptions};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Runs analyses through one staging policy and one analysis program.
#[derive(Debug, Clone)]
pub struct Analyzer<R = CommandRunner> {
    stager: Stager,
    invoker: Invoker<R>,
    default_input: Option<PathBuf>,
    concurrency: usize,
}

impl Analyzer<CommandRunner> {
    /// Build an analyzer that runs the configured program.
    pub fn from_config(config: &Config) -> Self {
        let runner = CommandRunner::new(config.analyzer.program.clone())
            .with_args(config.analyzer.args.clone())
            .with_working_dir(config.analyzer.working_dir.clone())
            .with_timeout(config.analyzer.timeout_seconds.map(Duration::from_secs));

        Analyzer::new(runner, Stager::new(StagingOptions::from(&config.staging)))
            .with_default_input(config.analyzer.default_input.clone())
            .with_concurrency(config.general.concurrency)
    }
}

impl<R: ProcessRunner> Analyzer<R> {
    pub fn new(runner: R, stager: Stager) -> Self {
        Self {
            stager,
            invoker: Invoker::new(runner),
            default_input: None,
            concurrency: 1,
        }
    }

    /// Input used by [`Analyzer::analyze_default`].
    pub fn with_default_input(mut self, path: Option<PathBuf>) -> Self {
        self.default_input = path;
        self
    }

    /// Number of batch items run at once (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn runner(&self) -> &R {
        self.invoker.runner()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Stage a request, invoke the program on it, then release the staged input.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<Value> {
        debug!("Analyzing {} input", request.kind());

        let staged = self.stager.stage(request).await?;
        let result = self.invoker.invoke(staged.path()).await;
        staged.release();

        result
    }

    /// Analyze an existing JSON file. The file is never modified or removed.
    pub async fn analyze_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        self.analyze(&AnalysisRequest::FilePath(path.as_ref().to_path_buf()))
            .await
    }

    /// Analyze an in-memory JSON value.
    pub async fn analyze_data(&self, data: Value) -> Result<Value> {
        self.analyze(&AnalysisRequest::StructuredData(data)).await
    }

    /// Analyze raw JSON text, rejecting it before any I/O if it does not parse.
    pub async fn analyze_text(&self, text: impl Into<String>) -> Result<Value> {
        self.analyze(&AnalysisRequest::RawText(text.into())).await
    }

    /// Analyze the configured default input.
    pub async fn analyze_default(&self) -> Result<Value> {
        let path = self
            .default_input
            .as_ref()
            .ok_or(AnalysisError::NoDefaultInput)?;

        info!("Analyzing default input: {}", path.display());
        self.analyze_file(path).await
    }

    /// Analyze every path, isolating failures per item.
    pub async fn analyze_batch(&self, paths: &[PathBuf]) -> BatchReport {
        let options = BatchOptions {
            concurrency: self.concurrency,
            ..BatchOptions::default()
        };
        batch::run_batch(self, paths, &options).await
    }
}
