//! Google Gemini Provider
//!
//! Calls the Generative Language API `generateContent` endpoint with an
//! API key.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::{Config, HealerError, Message, Result};
use crate::llm::provider::{http_client, status_error};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiProvider {
    /// Build the provider; requires a Gemini credential
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .llm
            .gemini_api_key
            .clone()
            .ok_or_else(|| HealerError::unavailable("GEMINI_API_KEY is not set"))?;

        Ok(Self {
            client: http_client(config.llm.timeout_secs)?,
            base_url: config
                .llm
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: config.llm.model().to_string(),
            temperature: config.llm.temperature,
        })
    }

    /// Create a provider against a custom endpoint
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(120)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.0,
        })
    }

    fn endpoint(&self) -> String {
        // Model names may be given as "google/gemini-..."
        let model = self.model.trim_start_matches("google/");
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    fn build_body(&self, messages: &[Message], options: &GenerateOptions) -> Value {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .collect();

        let contents: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| {
                json!({
                    "role": if m.role == "assistant" { "model" } else { "user" },
                    "parts": [{ "text": m.content }]
                })
            })
            .collect();

        let mut generation_config = json!({
            "candidateCount": 1,
            "temperature": options.temperature.unwrap_or(self.temperature),
        });
        if let Some(max_tokens) = options.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if !system.is_empty() {
            body["systemInstruction"] = json!({ "parts": [{ "text": system.join("\n\n") }] });
        }
        body
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn chat(
        &self,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let body = self.build_body(messages, &options.unwrap_or_default());

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(status_error("gemini", status, &error_text));
        }

        let response_json: Value = resp.json().await?;

        let content = response_json["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = &response_json["usageMetadata"];
        let usage = usage["totalTokenCount"].as_u64().map(|total| TokenUsage {
            prompt_tokens: usage["promptTokenCount"].as_u64().unwrap_or(0) as u32,
            completion_tokens: usage["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
            total_tokens: total as u32,
        });

        Ok(LLMResponse {
            content,
            usage,
            model: self.model.clone(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_strips_vendor_prefix() {
        let provider =
            GeminiProvider::with_base_url("http://x/v1beta", "k", "google/gemini-1.5-flash")
                .unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://x/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_system_messages_become_instruction() {
        let provider = GeminiProvider::with_base_url("http://x", "k", "m").unwrap();
        let body = provider.build_body(
            &[Message::system("rules"), Message::user("fix")],
            &GenerateOptions::default(),
        );
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "rules");
    }

    #[tokio::test]
    async fn test_chat_joins_parts() {
        let mock_server = MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "import os\n" }, { "text": "print(1)" }] }
            }],
            "usageMetadata": { "promptTokenCount": 5, "candidatesTokenCount": 4, "totalTokenCount": 9 }
        });

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/models/gemini-1.5-flash:generateContent"))
            .and(matchers::header("x-goog-api-key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let provider =
            GeminiProvider::with_base_url(mock_server.uri(), "g-key", "gemini-1.5-flash").unwrap();
        let response = provider.chat(&[Message::user("fix")], None).await.unwrap();
        assert_eq!(response.content, "import os\nprint(1)");
        assert_eq!(response.usage.unwrap().prompt_tokens, 5);
    }

    #[tokio::test]
    async fn test_forbidden_is_unavailable() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&mock_server)
            .await;

        let provider = GeminiProvider::with_base_url(mock_server.uri(), "bad", "m").unwrap();
        let err = provider.chat(&[Message::user("fix")], None).await.unwrap_err();
        assert!(matches!(err, HealerError::ModelUnavailable(_)));
    }
}
