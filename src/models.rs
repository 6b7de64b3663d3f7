//! Data models for the analysis layer.
//!
//! This module contains the request, outcome, and report types passed
//! between the stager, the invoker, and the batch coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One input handed to the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    /// An existing JSON file owned by the caller.
    FilePath(PathBuf),
    /// An in-memory JSON value that must be staged to disk.
    StructuredData(Value),
    /// Raw JSON text; validated before it is staged.
    RawText(String),
}

impl AnalysisRequest {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisRequest::FilePath(_) => "file",
            AnalysisRequest::StructuredData(_) => "data",
            AnalysisRequest::RawText(_) => "text",
        }
    }
}

impl From<PathBuf> for AnalysisRequest {
    fn from(path: PathBuf) -> Self {
        AnalysisRequest::FilePath(path)
    }
}

impl From<&Path> for AnalysisRequest {
    fn from(path: &Path) -> Self {
        AnalysisRequest::FilePath(path.to_path_buf())
    }
}

impl From<Value> for AnalysisRequest {
    fn from(value: Value) -> Self {
        AnalysisRequest::StructuredData(value)
    }
}

/// Outcome of a single batch item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Outcome {
    /// The analysis program returned this JSON value.
    Success(Value),
    /// Description of the error that stopped this item.
    Failure(String),
}

/// A batch outcome paired with the input that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// The originating input path.
    pub input: PathBuf,
    /// What happened to it.
    pub outcome: Outcome,
}

impl BatchItem {
    pub fn success(input: PathBuf, result: Value) -> Self {
        Self {
            input,
            outcome: Outcome::Success(result),
        }
    }

    pub fn failure(input: PathBuf, error: impl Into<String>) -> Self {
        Self {
            input,
            outcome: Outcome::Failure(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// The parsed result, if the item succeeded.
    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// The error description, if the item failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(message) => Some(message),
        }
    }
}

/// Ordered outcomes of a batch run, one per input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true when at least one item failed.
    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|item| !item.is_success())
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_items(&self.items)
    }
}

/// Totals for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Creates a summary from a list of batch items.
    pub fn from_items(items: &[BatchItem]) -> Self {
        let succeeded = items.iter().filter(|item| item.is_success()).count();
        Self {
            total: items.len(),
            succeeded,
            failed: items.len() - succeeded,
        }
    }
}

/// Metadata about a rendered batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Description of the analysis program that was run.
    pub program: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Wall-clock duration of the batch in seconds.
    pub duration_seconds: f64,
    /// Success and failure counts.
    pub summary: BatchSummary,
}
