//! CLI module - command-line interface
//!
//! Contains the two-phase driver, the interactive shell and its command
//! parsing.

pub mod commands;
pub mod driver;
pub mod repl;

pub use driver::{describe_outcome, parse_target_url, prompt_for_url, Driver};
pub use repl::{Shell, StatusLog};
