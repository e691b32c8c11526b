//! Locator repair agent
//!
//! Drives the bounded prompt → extract → validate loop. The first candidate
//! that parses is persisted and executed once; nothing about the run feeds
//! back into another attempt.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::extract::{extract_candidate, extract_fix_log};
use crate::agent::loop_state::{CandidateCheck, RepairAttempt, RepairLoopState, RepairPhase};
use crate::agent::prompt::build_prompt;
use crate::core::{Config, HealerError, Message, Result};
use crate::llm::LLMProvider;
use crate::tools::browser::read_snapshot;
use crate::tools::{ExecutionOutput, Sandbox, ScriptStore};

/// Callback for progress lines
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Result of a repair run
#[derive(Debug)]
pub enum RepairOutcome {
    /// A candidate parsed, was written and executed
    Repaired {
        attempts: usize,
        /// `FIX:` comments of the written script
        fix_log: Vec<String>,
        /// Outcome of the single run; errors here are not retried
        execution: Result<ExecutionOutput>,
    },
    /// Every attempt produced an empty or unparsable candidate
    GaveUp {
        attempts: usize,
        /// Last model reply, trimmed
        last_response: String,
    },
}

impl RepairOutcome {
    pub fn attempts(&self) -> usize {
        match self {
            RepairOutcome::Repaired { attempts, .. } | RepairOutcome::GaveUp { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_repaired(&self) -> bool {
        matches!(self, RepairOutcome::Repaired { .. })
    }
}

/// Repairs broken locators of one script against one snapshot
pub struct RepairAgent {
    llm: Arc<dyn LLMProvider>,
    store: ScriptStore,
    sandbox: Sandbox,
    snapshot_path: PathBuf,
    max_attempts: usize,
    progress: Option<ProgressCallback>,
}

impl RepairAgent {
    /// Create an agent over explicit parts
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        store: ScriptStore,
        sandbox: Sandbox,
        snapshot_path: impl Into<PathBuf>,
        max_attempts: usize,
    ) -> Self {
        Self {
            llm,
            store,
            sandbox,
            snapshot_path: snapshot_path.into(),
            max_attempts,
            progress: None,
        }
    }

    /// Create an agent from configuration
    pub fn from_config(config: &Config, llm: Arc<dyn LLMProvider>) -> Self {
        let store = ScriptStore::new(&config.paths.script, &config.repair.python);
        let sandbox = Sandbox::new(
            store.clone(),
            &config.repair.python,
            Duration::from_secs(config.repair.run_timeout_secs),
        );
        Self::new(
            llm,
            store,
            sandbox,
            &config.paths.ui_dump,
            config.repair.max_attempts,
        )
    }

    /// Report progress lines through `callback`
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    fn report(&self, line: &str) {
        if let Some(ref cb) = self.progress {
            cb(line);
        }
    }

    /// Repair the script for `url` using the snapshot on disk.
    ///
    /// A missing snapshot or script is an error before any model call.
    pub async fn repair(&self, url: &str) -> Result<RepairOutcome> {
        let records = read_snapshot(&self.snapshot_path).await?;
        let snapshot_json = serde_json::to_string(&records)?;
        let script = self.store.read().await?;

        self.repair_with(url, &snapshot_json, &script).await
    }

    /// Run the loop against already loaded inputs
    pub async fn repair_with(
        &self,
        url: &str,
        snapshot_json: &str,
        script: &str,
    ) -> Result<RepairOutcome> {
        // The prompt is identical on every attempt
        let messages = [Message::user(build_prompt(url, snapshot_json, script))];
        let mut state = RepairLoopState::new(self.max_attempts);
        let mut last_response = String::new();

        tracing::info!(
            url,
            model = self.llm.model(),
            max_attempts = self.max_attempts,
            "Starting repair loop"
        );

        while state.should_continue() {
            state.begin_attempt();
            self.report(&format!(
                "[Attempt {}/{}] Asking {} for a repaired script...",
                state.attempt,
                state.max_attempts,
                self.llm.model()
            ));

            state.enter(RepairPhase::AwaitingModel);
            let response = self.llm.chat(&messages, None).await?;
            let raw = response.content.trim().to_string();

            state.enter(RepairPhase::Extracting);
            let candidate = extract_candidate(&raw);

            let check = if candidate.is_empty() {
                CandidateCheck::Empty
            } else {
                state.enter(RepairPhase::Validating);
                match self.store.validate(&candidate).await {
                    Ok(()) => CandidateCheck::Valid,
                    Err(HealerError::InvalidSyntax(msg)) => CandidateCheck::Invalid(msg),
                    Err(e) if e.is_retryable() => CandidateCheck::Empty,
                    Err(e) => return Err(e),
                }
            };

            match &check {
                CandidateCheck::Empty => {
                    tracing::warn!(attempt = state.attempt, "Model returned no code");
                    self.report("  No code found in the reply.");
                }
                CandidateCheck::Invalid(msg) => {
                    tracing::warn!(attempt = state.attempt, error = %msg, "Candidate failed to parse");
                    self.report(&format!("  Syntax error: {}", msg));
                }
                CandidateCheck::Valid => {}
            }

            let valid = check.is_valid();
            state.record(RepairAttempt {
                number: state.attempt,
                raw_response: raw.clone(),
                candidate: candidate.clone(),
                check,
            });
            last_response = raw;

            if !valid {
                continue;
            }

            state.enter(RepairPhase::Persisting);
            self.store.write(&candidate).await?;
            self.report(&format!(
                "  Valid script saved to {}",
                self.store.path().display()
            ));

            let fix_log = extract_fix_log(&candidate);
            self.report(&format!(
                "  Running the repaired script (timeout {}s)...",
                self.sandbox.timeout().as_secs()
            ));
            let execution = self.sandbox.run().await;
            if let Err(ref e) = execution {
                tracing::warn!(error = %e, "Repaired script did not run to completion");
            }

            state.enter(RepairPhase::Done);
            tracing::info!(attempts = state.attempt, fixes = fix_log.len(), "Repair finished");
            return Ok(RepairOutcome::Repaired {
                attempts: state.attempt,
                fix_log,
                execution,
            });
        }

        tracing::warn!(attempts = state.attempt, "Giving up after exhausting attempts");
        Ok(RepairOutcome::GaveUp {
            attempts: state.attempt,
            last_response,
        })
    }
}
