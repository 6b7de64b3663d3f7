//! Input staging.
//!
//! The analysis program only accepts a path, so in-memory inputs are written
//! to a uniquely named temporary file for the duration of one invocation.
//! [`StagedInput`] owns that file and removes it when dropped, which covers
//! normal returns, errors, panics, and cancelled futures alike.

use crate::error::{AnalysisError, Result};
use crate::models::AnalysisRequest;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};

/// Options controlling where and how inputs are staged.
#[derive(Debug, Clone)]
pub struct StagingOptions {
    /// Directory for staged files (None for the system temp directory).
    pub temp_dir: Option<PathBuf>,
    /// File name prefix for staged files.
    pub prefix: String,
    /// Pretty-print serialized structured data.
    pub pretty: bool,
}

impl Default for StagingOptions {
    fn default() -> Self {
        Self {
            temp_dir: None,
            prefix: "cyclecheck-".to_string(),
            pretty: true,
        }
    }
}

impl From<&crate::config::StagingConfig> for StagingOptions {
    fn from(config: &crate::config::StagingConfig) -> Self {
        Self {
            temp_dir: config.temp_dir.clone(),
            prefix: config.prefix.clone(),
            pretty: config.pretty,
        }
    }
}

/// A path holding valid JSON for one invocation.
///
/// Temporary files are deleted when the guard is released or dropped;
/// caller-owned files are left untouched.
#[derive(Debug)]
pub struct StagedInput {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl StagedInput {
    fn borrowed(path: PathBuf) -> Self {
        Self { path, temp: None }
    }

    fn temporary(temp: TempPath) -> Self {
        Self {
            path: temp.to_path_buf(),
            temp: Some(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true when this guard owns (and will delete) the file.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Delete the staged file now.
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let Some(temp) = self.temp.take() else {
            return;
        };

        match temp.close() {
            Ok(()) => debug!("Removed staged input {}", self.path.display()),
            Err(e) => warn!(
                "Cleanup warning: failed to remove staged input {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for StagedInput {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Turns an [`AnalysisRequest`] into a path the analysis program can read.
#[derive(Debug, Clone, Default)]
pub struct Stager {
    options: StagingOptions,
}

impl Stager {
    pub fn new(options: StagingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StagingOptions {
        &self.options
    }

    /// Stage a request.
    ///
    /// File paths pass through untouched. Structured data is serialized and
    /// raw text is validated before anything touches the filesystem.
    pub async fn stage(&self, request: &AnalysisRequest) -> Result<StagedInput> {
        match request {
            AnalysisRequest::FilePath(path) => {
                let exists = tokio::fs::try_exists(path)
                    .await
                    .map_err(|e| AnalysisError::staging("failed to check input", e))?;
                if !exists {
                    return Err(AnalysisError::InputNotFound(path.clone()));
                }
                Ok(StagedInput::borrowed(path.clone()))
            }
            AnalysisRequest::StructuredData(value) => {
                let content = self.serialize(value)?;
                self.write_temp(content.as_bytes()).await
            }
            AnalysisRequest::RawText(text) => {
                serde_json::from_str::<Value>(text).map_err(AnalysisError::InvalidInput)?;
                self.write_temp(text.as_bytes()).await
            }
        }
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        let serialized = if self.options.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };

        serialized.map_err(|e| AnalysisError::staging("failed to serialize data", e.into()))
    }

    async fn write_temp(&self, content: &[u8]) -> Result<StagedInput> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.options.prefix).suffix(".json");

        let file = match self.options.temp_dir {
            Some(ref dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| AnalysisError::staging("failed to create temporary file", e))?;

        // The guard exists before the write so a failed write still cleans up.
        let staged = StagedInput::temporary(file.into_temp_path());

        tokio::fs::write(staged.path(), content).await.map_err(|e| {
            AnalysisError::staging(
                format!("failed to write {}", staged.path().display()),
                e,
            )
        })?;

        debug!(
            "Staged {} bytes at {}",
            content.len(),
            staged.path().display()
        );

        Ok(staged)
    }
}
