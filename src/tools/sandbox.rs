//! Execution sandbox
//!
//! Runs the stored script as a child process with a wall-clock bound.
//! There is no filesystem or network isolation: the script runs with the
//! privileges of the healer itself.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::core::{HealerError, Result};
use crate::tools::script::ScriptStore;

/// Captured streams of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
}

impl ExecutionOutput {
    /// Whether the script exited with status 0
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl fmt::Display for ExecutionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "STDOUT:\n{}\nSTDERR:\n{}", self.stdout, self.stderr)
    }
}

/// Runs the script held by a `ScriptStore`
#[derive(Clone)]
pub struct Sandbox {
    store: ScriptStore,
    interpreter: String,
    timeout: Duration,
}

impl Sandbox {
    /// Create a sandbox for `store`
    pub fn new(store: ScriptStore, interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            store,
            interpreter: interpreter.into(),
            timeout,
        }
    }

    /// Wall-clock bound
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Re-validate and run the script.
    ///
    /// A non-zero exit is still `Ok`: failure is not distinguished from
    /// success at this layer.
    pub async fn run(&self) -> Result<ExecutionOutput> {
        let code = self.store.read().await?;
        self.store.validate(&code).await?;

        let path = self.store.path();
        let file_arg = path.file_name().unwrap_or(path.as_os_str());
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(file_arg)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        tracing::info!(script = %path.display(), timeout_secs = self.timeout.as_secs(), "Running script");

        let child = cmd
            .spawn()
            .map_err(|e| HealerError::LaunchFailure(format!("{}: {}", self.interpreter, e)))?;

        // Dropping the pending future on timeout kills the child
        match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ExecutionOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            }),
            Ok(Err(e)) => Err(HealerError::LaunchFailure(e.to_string())),
            Err(_) => {
                tracing::warn!(script = %path.display(), "Script timed out and was killed");
                Err(HealerError::ExecutionTimeout {
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_display() {
        let output = ExecutionOutput {
            stdout: "ok\n".into(),
            stderr: String::new(),
            exit_code: Some(0),
        };
        assert_eq!(output.to_string(), "STDOUT:\nok\n\nSTDERR:\n");
        assert!(output.succeeded());
    }

    #[tokio::test]
    async fn test_missing_script() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScriptStore::new(dir.path().join("absent.py"), "python3");
        let sandbox = Sandbox::new(store, "python3", Duration::from_secs(5));
        let err = sandbox.run().await.unwrap_err();
        assert!(matches!(err, HealerError::MissingFile { .. }));
    }
}
