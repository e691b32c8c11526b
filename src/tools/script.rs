//! Script store
//!
//! Owns the single automation script file. Every write is validated first
//! and replaces the whole file, so the on-disk content always parses.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::{HealerError, Result};
use crate::tools::syntax::{PythonSyntax, SyntaxValidator};

/// Reads, validates and overwrites one script file
#[derive(Clone)]
pub struct ScriptStore {
    path: PathBuf,
    validator: Arc<dyn SyntaxValidator>,
}

impl ScriptStore {
    /// Create a store validating with the given Python interpreter
    pub fn new(path: impl Into<PathBuf>, interpreter: impl Into<String>) -> Self {
        Self::with_validator(path, Arc::new(PythonSyntax::new(interpreter)))
    }

    /// Create a store with a custom validator
    pub fn with_validator(path: impl Into<PathBuf>, validator: Arc<dyn SyntaxValidator>) -> Self {
        Self {
            path: path.into(),
            validator,
        }
    }

    /// Path of the managed script
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the script file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Current script content
    pub async fn read(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(HealerError::missing(&self.path))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check `code` without touching the file
    pub async fn validate(&self, code: &str) -> Result<()> {
        if code.trim().is_empty() {
            return Err(HealerError::EmptyCandidate);
        }
        self.validator.validate(code).await
    }

    /// Replace the script with `code`.
    ///
    /// Rejected input leaves the existing file untouched. Accepted input is
    /// written to a sibling temp file and renamed over the target.
    pub async fn write(&self, code: &str) -> Result<()> {
        self.validate(code).await?;

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, code).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::info!(path = %self.path.display(), bytes = code.len(), "Script written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "script".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}
