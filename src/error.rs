//! Error types for the analysis layer.
//!
//! Single-item operations surface these directly; the batch coordinator
//! folds them into per-item failure descriptions.

use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of characters of program output kept in a parse error.
const EXCERPT_LIMIT: usize = 200;

/// Errors raised while staging, invoking, or parsing an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Caller supplied JSON text that does not parse.
    #[error("invalid JSON input: {0}")]
    InvalidInput(#[source] serde_json::Error),

    /// A file-path input does not exist.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input could not be checked, or the staged temporary file could not be written.
    #[error("failed to stage input: {message}: {source}")]
    Staging {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The analysis program could not start, exited with failure, or timed out.
    #[error("analysis program `{program}` failed: {detail}")]
    Process { program: String, detail: String },

    /// The analysis program's standard output is not valid JSON.
    #[error("analysis output is not valid JSON ({source}): {excerpt}")]
    Parse {
        #[source]
        source: serde_json::Error,
        excerpt: String,
    },

    /// `analyze_default` was called without a configured default input.
    #[error(
        "no default input configured; set analyzer.default_input or CYCLECHECK_DEFAULT_INPUT"
    )]
    NoDefaultInput,
}

impl AnalysisError {
    /// Create a process error for the given program.
    pub fn process(program: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Process {
            program: program.into(),
            detail: detail.into(),
        }
    }

    /// Create a staging error with a short description of the failed step.
    pub fn staging(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Staging {
            message: message.into(),
            source,
        }
    }

    /// Create a parse error, keeping a bounded excerpt of the raw output.
    pub fn parse(source: serde_json::Error, output: &[u8]) -> Self {
        let text = String::from_utf8_lossy(output);
        let trimmed = text.trim();
        let excerpt = if trimmed.is_empty() {
            "<empty output>".to_string()
        } else if trimmed.chars().count() > EXCERPT_LIMIT {
            let head: String = trimmed.chars().take(EXCERPT_LIMIT).collect();
            format!("{}...", head)
        } else {
            trimmed.to_string()
        };

        Self::Parse { source, excerpt }
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("not json").unwrap_err()
    }

    #[test]
    fn test_process_error_message() {
        let err = AnalysisError::process("python3 checek.py", "exit status 1: boom");
        assert_eq!(
            err.to_string(),
            "analysis program `python3 checek.py` failed: exit status 1: boom"
        );
    }

    #[test]
    fn test_input_not_found_mentions_path() {
        let err = AnalysisError::InputNotFound(PathBuf::from("/missing.json"));
        let message = err.to_string();
        assert!(message.contains("not found"));
        assert!(message.contains("/missing.json"));
    }

    #[test]
    fn test_parse_excerpt_is_truncated() {
        let output = "x".repeat(500);
        let err = AnalysisError::parse(json_error(), output.as_bytes());
        match err {
            AnalysisError::Parse { excerpt, .. } => {
                assert!(excerpt.ends_with("..."));
                assert_eq!(excerpt.chars().count(), EXCERPT_LIMIT + 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_excerpt_empty_output() {
        let err = AnalysisError::parse(json_error(), b"  \n");
        assert!(err.to_string().contains("<empty output>"));
    }
}
