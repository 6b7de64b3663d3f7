//! External process execution.
//!
//! The analysis program is reached through the [`ProcessRunner`] capability
//! so the invoker can be exercised without spawning real processes.

use crate::error::{AnalysisError, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Captured streams and exit status of one program run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl ProcessOutput {
    /// A successful run that printed `stdout`.
    pub fn succeeded(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    /// A failed run with the given exit code and diagnostics.
    pub fn failed(exit_code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            success: false,
        }
    }

    /// Attach diagnostic output to this run.
    pub fn with_stderr(mut self, stderr: impl Into<Vec<u8>>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Human-readable exit status.
    pub fn status_label(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs the analysis program against a staged input path.
pub trait ProcessRunner: Send + Sync {
    /// Description of the program, used in errors and logs.
    fn program(&self) -> &str;

    /// Run the program with `input` as its final argument.
    ///
    /// Fails only when the program cannot be run to completion; a non-zero
    /// exit is reported through [`ProcessOutput::success`].
    fn run(&self, input: &Path) -> impl Future<Output = Result<ProcessOutput>> + Send;
}

/// Runs a real program through `tokio::process`.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    label: String,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            label: program.clone(),
            program,
            args: Vec::new(),
            working_dir: None,
            timeout: None,
        }
    }

    /// Arguments placed before the input path.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self.label = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Bound each run. `None` waits for the program indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl ProcessRunner for CommandRunner {
    fn program(&self) -> &str {
        &self.label
    }

    async fn run(&self, input: &Path) -> Result<ProcessOutput> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            command.current_dir(dir);
        }

        debug!("Spawning `{}` on {}", self.label, input.display());

        let child = command
            .spawn()
            .map_err(|e| AnalysisError::process(&self.label, format!("failed to start: {}", e)))?;

        // Dropping the wait future drops the child, which kills it.
        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                AnalysisError::process(
                    &self.label,
                    format!("timed out after {}s", limit.as_secs_f64()),
                )
            })?,
            None => wait.await,
        }
        .map_err(|e| AnalysisError::process(&self.label, format!("failed while running: {}", e)))?;

        Ok(ProcessOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
            success: output.status.success(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory runner for tests.

    use super::*;
    use std::sync::{Arc, Mutex};

    type Responder = dyn Fn(&Path) -> ProcessOutput + Send + Sync;

    /// Records every call and answers with a canned response.
    #[derive(Clone)]
    pub struct FakeRunner {
        respond: Arc<Responder>,
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl FakeRunner {
        pub fn new(respond: impl Fn(&Path) -> ProcessOutput + Send + Sync + 'static) -> Self {
            Self {
                respond: Arc::new(respond),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Always prints `stdout` and exits successfully.
        pub fn replying(stdout: &str) -> Self {
            let stdout = stdout.to_string();
            Self::new(move |_| ProcessOutput::succeeded(stdout.clone()))
        }

        /// Echoes the staged file back, like `cat`.
        pub fn echoing() -> Self {
            Self::new(|path| match std::fs::read(path) {
                Ok(bytes) => ProcessOutput::succeeded(bytes),
                Err(e) => ProcessOutput::failed(1, e.to_string()),
            })
        }

        pub fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ProcessRunner for FakeRunner {
        fn program(&self) -> &str {
            "fake-checker"
        }

        fn run(&self, input: &Path) -> impl Future<Output = Result<ProcessOutput>> + Send {
            self.calls.lock().unwrap().push(input.to_path_buf());
            let output = (self.respond)(input);
            async move { Ok(output) }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("input.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_program_label_includes_args() {
        let runner = CommandRunner::new("python3").with_args(["checker/checek.py"]);
        assert_eq!(runner.program(), "python3 checker/checek.py");
        assert!(runner.timeout().is_none());
    }

    #[tokio::test]
    async fn test_command_runner_captures_stdout() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, r#"{"ok":true}"#);

        let output = CommandRunner::new("cat").run(&input).await.unwrap();
        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout, br#"{"ok":true}"#.to_vec());
    }

    #[tokio::test]
    async fn test_command_runner_reports_failure_status() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "{}");

        let output = CommandRunner::new("sh")
            .with_args(["-c", "echo broken >&2; exit 3", "sh"])
            .run(&input)
            .await
            .unwrap();

        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "broken");
        assert_eq!(output.status_label(), "exit status 3");
    }

    #[tokio::test]
    async fn test_command_runner_missing_program() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "{}");

        let err = CommandRunner::new("cyclecheck-no-such-program")
            .run(&input)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Process { .. }));
        assert!(err.to_string().contains("failed to start"));
    }

    #[tokio::test]
    async fn test_command_runner_timeout() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "{}");

        let err = CommandRunner::new("sh")
            .with_args(["-c", "sleep 5", "sh"])
            .with_timeout(Some(Duration::from_millis(200)))
            .run(&input)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timed out"));
    }
}
