//! LLM Provider implementations and factory
//!
//! Submodules implement specific providers (OpenRouter, Gemini).

pub mod gemini;
pub mod openrouter;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::core::config::{Config, ProviderType};
use crate::core::{HealerError, Result};
use crate::llm::traits::LLMProvider;

use self::gemini::GeminiProvider;
use self::openrouter::OpenRouterProvider;

/// Create the configured LLM provider.
///
/// Fails with `ModelUnavailable` before any request is made when the
/// selected provider has no credential.
pub fn create_provider(config: &Config) -> Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match config.llm.provider {
        ProviderType::OpenRouter => Arc::new(OpenRouterProvider::from_config(config)?),
        ProviderType::Gemini => Arc::new(GeminiProvider::from_config(config)?),
    };
    tracing::debug!(
        provider = provider.name(),
        model = provider.model(),
        "LLM provider ready"
    );
    Ok(provider)
}

/// Build the shared HTTP client used by the remote providers
pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| HealerError::unavailable(format!("Failed to create HTTP client: {}", e)))
}

/// Map a non-success API reply to an error
pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode, body: &str) -> HealerError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        HealerError::unavailable(format!("{} rejected the credential ({}): {}", provider, status, body))
    } else {
        HealerError::provider(format!("{} API error ({}): {}", provider, status, body))
    }
}
