//! OpenAI-compatible chat completion client
//!
//! Speaks the `/chat/completions` protocol shared by OpenRouter, OpenAI and most
//! self-hosted gateways.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::{ChatMessage, CompletionBackend, CompletionRequest, LLMConfig};

/// Client for a hosted chat completion API
pub struct ChatCompletionClient {
    client: reqwest::Client,
    config: LLMConfig,
}

impl ChatCompletionClient {
    pub fn new(config: LLMConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {}", name))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let started = Instant::now();
        debug!(
            ">>> LLM Request: model={}, messages={}, temperature={}, max_tokens={}",
            self.config.model,
            request.messages.len(),
            request.temperature,
            request.max_tokens
        );

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&ChatCompletionBody {
                model: &self.config.model,
                messages: &request.messages,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
            })
            .send()
            .await
            .context("Failed to send chat completion request")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!("<<< LLM Error: status={}, body={}", status, body);
            anyhow::bail!("LLM request failed ({}): {}", status, body);
        }

        let response: ChatCompletionResponse = resp
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat completion response contained no message content")?;

        info!(
            model = %self.config.model,
            latency_ms = started.elapsed().as_millis() as u64,
            "llm_call"
        );

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LLMConfig {
        LLMConfig {
            base_url: server.uri(),
            api_key: "sk-or-v1-test".to_string(),
            model: "test/model".to_string(),
            timeout_secs: 5,
            extra_headers: vec![("X-Title".to_string(), "Peitho Backend".to_string())],
        }
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() -> Result<()> {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-or-v1-test"))
            .and(header("x-title", "Peitho Backend"))
            .and(body_partial_json(json!({
                "model": "test/model",
                "temperature": 0.1,
                "max_tokens": 200
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "{\"intent\":\"mpf_consolidation\"}" } }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ChatCompletionClient::new(config_for(&mock_server))?;
        let text = client
            .complete(CompletionRequest::new("system", "user"))
            .await?;

        assert_eq!(text, "{\"intent\":\"mpf_consolidation\"}");
        assert_eq!(client.model(), "test/model");

        Ok(())
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() -> Result<()> {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("No auth credentials found"),
            )
            .mount(&mock_server)
            .await;

        let client = ChatCompletionClient::new(config_for(&mock_server))?;
        let err = client
            .complete(CompletionRequest::new("system", "user"))
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("No auth credentials found"));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() -> Result<()> {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&mock_server)
            .await;

        let client = ChatCompletionClient::new(config_for(&mock_server))?;
        let result = client
            .complete(CompletionRequest::new("system", "user"))
            .await;

        assert!(result.is_err());

        Ok(())
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() -> Result<()> {
        let client = ChatCompletionClient::new(LLMConfig {
            base_url: "https://openrouter.ai/api/v1/".to_string(),
            ..LLMConfig::default()
        })?;

        assert_eq!(
            client.endpoint(),
            "https://openrouter.ai/api/v1/chat/completions"
        );

        Ok(())
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let result = ChatCompletionClient::new(LLMConfig {
            extra_headers: vec![("bad header".to_string(), "x".to_string())],
            ..LLMConfig::default()
        });

        assert!(result.is_err());
    }
}
