//! In-process completion backends for tests

use anyhow::Result;
use async_trait::async_trait;
use peitho_llm::{CompletionBackend, CompletionRequest};
use std::sync::Mutex;
use std::time::Duration;

/// Replies with a fixed text (or error) and records every request it receives.
pub struct ScriptedBackend {
    reply: Result<String, String>,
    delay: Option<Duration>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(e) => Err(anyhow::anyhow!("{}", e)),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
