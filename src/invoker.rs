//! Analysis program invocation.

use crate::error::{AnalysisError, Result};
use crate::runner::ProcessRunner;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Runs the analysis program on one path and parses its verdict.
#[derive(Debug, Clone)]
pub struct Invoker<R> {
    runner: R,
}

impl<R: ProcessRunner> Invoker<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Invoke the program with `input` and parse its standard output.
    ///
    /// Diagnostics on a successful run are logged, not raised.
    pub async fn invoke(&self, input: &Path) -> Result<Value> {
        let program = self.runner.program();
        debug!("Invoking `{}` on {}", program, input.display());

        let output = self.runner.run(input).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if !output.success {
            let detail = if stderr.is_empty() {
                output.status_label()
            } else {
                format!("{}: {}", output.status_label(), stderr)
            };
            return Err(AnalysisError::process(program, detail));
        }

        if !stderr.is_empty() {
            warn!(
                "`{}` reported diagnostics for {}: {}",
                program,
                input.display(),
                stderr
            );
        }

        serde_json::from_slice(&output.stdout).map_err(|e| AnalysisError::parse(e, &output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::FakeRunner;
    use crate::runner::ProcessOutput;
    use serde_json::json;

    #[tokio::test]
    async fn test_invoke_parses_stdout() {
        let invoker = Invoker::new(FakeRunner::replying(r#"{"tests":[{"results":"ok"}]}"#));

        let result = invoker.invoke(Path::new("/tmp/input.json")).await.unwrap();

        assert_eq!(result, json!({"tests": [{"results": "ok"}]}));
        assert_eq!(
            invoker.runner().calls(),
            vec![std::path::PathBuf::from("/tmp/input.json")]
        );
    }

    #[tokio::test]
    async fn test_failed_exit_is_process_error() {
        let invoker = Invoker::new(FakeRunner::new(|_| {
            ProcessOutput::failed(2, "Traceback: FileNotFoundError\n")
        }));

        let err = invoker.invoke(Path::new("/tmp/x.json")).await.unwrap_err();

        match err {
            AnalysisError::Process { program, detail } => {
                assert_eq!(program, "fake-checker");
                assert_eq!(detail, "exit status 2: Traceback: FileNotFoundError");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_exit_without_stderr() {
        let invoker = Invoker::new(FakeRunner::new(|_| ProcessOutput::failed(1, "")));

        let err = invoker.invoke(Path::new("/tmp/x.json")).await.unwrap_err();

        assert!(err.to_string().ends_with("exit status 1"));
    }

    #[tokio::test]
    async fn test_non_json_stdout_is_parse_error() {
        let invoker = Invoker::new(FakeRunner::replying("Checking step 1...\nOK"));

        let err = invoker.invoke(Path::new("/tmp/x.json")).await.unwrap_err();

        assert!(matches!(err, AnalysisError::Parse { .. }));
        assert!(err.to_string().contains("Checking step 1"));
    }

    #[tokio::test]
    async fn test_stderr_on_success_is_not_fatal() {
        let invoker = Invoker::new(FakeRunner::new(|_| {
            ProcessOutput::succeeded(r#"{"tests":[]}"#).with_stderr("DeprecationWarning: ...")
        }));

        let result = invoker.invoke(Path::new("/tmp/x.json")).await.unwrap();

        assert_eq!(result, json!({"tests": []}));
    }
}
