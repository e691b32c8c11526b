//! LLM module - Language Model integrations
//!
//! Provides the provider abstraction and the remote backends it can be
//! constructed from.

pub mod provider;
pub mod traits;

pub use provider::create_provider;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};
