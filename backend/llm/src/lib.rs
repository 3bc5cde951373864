use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;

pub use client::ChatCompletionClient;

/// Role of a single chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single chat completion call: messages plus sampling controls.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Build the usual system + user pair
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: 0.1,
            max_tokens: 200,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Anything that can turn a system + user prompt into completion text.
///
/// Classification and discovery only need this capability, so any hosted or local
/// backend can be swapped in without touching prompt or parsing logic.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion and return the raw text of the first choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Model identifier, for logging and health reporting.
    fn model(&self) -> &str;
}

/// Connection settings for an OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Extra headers sent with every request (e.g. `HTTP-Referer`, `X-Title`)
    pub extra_headers: Vec<(String, String)>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: String::new(),
            model: "z-ai/glm-4.5-air".to_string(),
            // Bounded so that a hung upstream still reaches the fallback path
            timeout_secs: 30,
            extra_headers: Vec::new(),
        }
    }
}
