//! Repair loop state management
//!
//! Tracks the bounded attempt loop: which phase it is in and what each
//! attempt produced.

use serde::{Deserialize, Serialize};

/// Phase of the repair loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairPhase {
    Prompting,
    AwaitingModel,
    Extracting,
    Validating,
    Persisting,
    Retry,
    GiveUp,
    Done,
}

/// How a candidate fared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateCheck {
    /// Nothing usable was extracted
    Empty,
    /// The candidate failed to parse
    Invalid(String),
    /// The candidate parsed
    Valid,
}

impl CandidateCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, CandidateCheck::Valid)
    }
}

/// One prompt → response → validate iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairAttempt {
    /// 1-based attempt number
    pub number: usize,
    /// Model reply, trimmed
    pub raw_response: String,
    /// Extracted candidate
    pub candidate: String,
    pub check: CandidateCheck,
}

/// State of the repair loop
#[derive(Debug, Clone)]
pub struct RepairLoopState {
    /// Attempts started so far
    pub attempt: usize,
    /// Maximum allowed attempts
    pub max_attempts: usize,
    /// Current phase
    pub phase: RepairPhase,
    /// Finished attempts, in order
    pub attempts: Vec<RepairAttempt>,
}

impl RepairLoopState {
    /// Create a new loop state with the given bound
    pub fn new(max_attempts: usize) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            phase: RepairPhase::Prompting,
            attempts: Vec::new(),
        }
    }

    /// Check if another attempt may start
    pub fn should_continue(&self) -> bool {
        self.attempt < self.max_attempts
            && !matches!(self.phase, RepairPhase::GiveUp | RepairPhase::Done)
    }

    /// Start the next attempt
    pub fn begin_attempt(&mut self) {
        self.attempt += 1;
        self.enter(RepairPhase::Prompting);
    }

    /// Move to `phase`
    pub fn enter(&mut self, phase: RepairPhase) {
        tracing::debug!(attempt = self.attempt, from = ?self.phase, to = ?phase, "Repair phase");
        self.phase = phase;
    }

    /// Record the outcome of the current attempt.
    ///
    /// An unusable candidate moves the loop to `Retry`, or to `GiveUp` once
    /// the bound is reached.
    pub fn record(&mut self, attempt: RepairAttempt) {
        let valid = attempt.check.is_valid();
        self.attempts.push(attempt);
        if !valid {
            if self.exhausted() {
                self.enter(RepairPhase::GiveUp);
            } else {
                self.enter(RepairPhase::Retry);
            }
        }
    }

    /// Whether the bound is reached
    pub fn exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}
