//! Agent module - the locator repair loop
//!
//! Builds the repair prompt, pulls candidates out of model replies and
//! drives the bounded attempt loop.

pub mod extract;
pub mod loop_state;
pub mod prompt;
pub mod repair;

pub use extract::{extract_candidate, extract_fix_log};
pub use loop_state::{CandidateCheck, RepairAttempt, RepairLoopState, RepairPhase};
pub use prompt::build_prompt;
pub use repair::{ProgressCallback, RepairAgent, RepairOutcome};
