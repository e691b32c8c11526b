//! Syntax validation for automation scripts
//!
//! Validation is purely syntactic: the candidate is handed to the Python
//! interpreter's own parser and never executed.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::{HealerError, Result};

/// Parses script text without running it
#[async_trait]
pub trait SyntaxValidator: Send + Sync {
    /// `Ok(())` when `code` parses, `InvalidSyntax` otherwise
    async fn validate(&self, code: &str) -> Result<()>;
}

// Raw bytes go to the parser so decoding matches running the file
const PARSE_SNIPPET: &str = r#"import ast, sys
src = sys.stdin.buffer.read()
try:
    ast.parse(src, filename="<candidate>")
except (SyntaxError, ValueError) as e:
    line = getattr(e, "lineno", None)
    msg = getattr(e, "msg", None) or str(e)
    report = "%s (line %s)" % (msg, line) if line else msg
    sys.stderr.buffer.write(report.encode("utf-8", "replace"))
    sys.exit(1)
"#;

const PARSE_TIMEOUT: Duration = Duration::from_secs(15);

/// Validator backed by the interpreter's `ast.parse`
#[derive(Debug, Clone)]
pub struct PythonSyntax {
    interpreter: String,
}

impl PythonSyntax {
    /// Create a validator using the given interpreter
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    /// Interpreter command
    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Check whether the interpreter can be launched
    pub async fn is_available(&self) -> bool {
        Command::new(&self.interpreter)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl Default for PythonSyntax {
    fn default() -> Self {
        Self::new(if cfg!(windows) { "python" } else { "python3" })
    }
}

#[async_trait]
impl SyntaxValidator for PythonSyntax {
    async fn validate(&self, code: &str) -> Result<()> {
        let mut child = Command::new(&self.interpreter)
            .args(["-c", PARSE_SNIPPET])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                HealerError::LaunchFailure(format!("{}: {}", self.interpreter, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes()).await?;
            stdin.flush().await?;
        }

        let output = timeout(PARSE_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| HealerError::LaunchFailure("syntax check timed out".to_string()))??;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(HealerError::InvalidSyntax(if stderr.is_empty() {
                format!("parser exited with {}", output.status)
            } else {
                stderr
            }))
        }
    }
}
