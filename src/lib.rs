//! Selenium Healer - locator repair for Selenium scripts
//!
//! Captures the interactive elements of a live page, asks a language model
//! to fix the broken locators of a Python Selenium script against that
//! capture, and runs the first repaired script that parses.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Provider abstraction with OpenRouter and Gemini clients
//! - **Tools**: DOM snapshotter, script store, syntax validator, sandbox
//! - **Agent**: The bounded repair loop
//! - **CLI**: Two-phase driver and interactive shell
//!
//! # Usage
//!
//! ```rust,no_run
//! use selenium_healer::{create_provider, Config, RepairAgent};
//!
//! #[tokio::main]
//! async fn main() -> selenium_healer::Result<()> {
//!     let config = Config::load();
//!     let llm = create_provider(&config)?;
//!
//!     let agent = RepairAgent::from_config(&config, llm);
//!     let outcome = agent.repair("https://example.com/login").await?;
//!     println!("repaired: {}", outcome.is_repaired());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{RepairAgent, RepairOutcome};
pub use cli::{Driver, Shell};
pub use core::{Config, HealerError, Result};
pub use llm::create_provider;
