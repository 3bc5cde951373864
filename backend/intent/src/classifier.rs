use anyhow::Result;
use peitho_llm::{CompletionBackend, CompletionRequest};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::definitions::IntentDefinitions;
use crate::error::IntentError;
use crate::fallback::fallback;
use crate::prompt::{classification_system_prompt, classification_user_message};
use crate::response::{parse_classification, ParsedClassification};
use crate::traditional::simulate_traditional_nlp;
use crate::{ClassificationComparison, ClassificationResult};

/// Sampling and timeout settings for the two kinds of LLM calls
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub discovery_temperature: f32,
    pub discovery_max_tokens: u32,
    /// Upper bound on a single completion call, whatever the backend does
    pub request_timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 200,
            discovery_temperature: 0.3,
            discovery_max_tokens: 800,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Reject blank inquiries before they reach either classifier.
pub fn validate_input(text: &str) -> Result<&str, IntentError> {
    if text.trim().is_empty() {
        return Err(IntentError::EmptyInput);
    }
    Ok(text)
}

/// LLM intent classifier with keyword fallback
pub struct IntentClassifier {
    backend: Arc<dyn CompletionBackend>,
    definitions: Arc<IntentDefinitions>,
    config: ClassifierConfig,
}

impl IntentClassifier {
    pub fn new(backend: Arc<dyn CompletionBackend>, definitions: IntentDefinitions) -> Self {
        Self {
            backend,
            definitions: Arc::new(definitions),
            config: ClassifierConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn definitions(&self) -> &IntentDefinitions {
        &self.definitions
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// One bounded completion call
    pub(crate) async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let timeout = self.config.request_timeout;
        match tokio::time::timeout(timeout, self.backend.complete(request)).await {
            Ok(result) => result,
            Err(_) => anyhow::bail!("LLM request timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn request_classification(&self, text: &str) -> Result<ParsedClassification> {
        let request = CompletionRequest::new(
            classification_system_prompt(&self.definitions),
            classification_user_message(text),
        )
        .temperature(self.config.temperature)
        .max_tokens(self.config.max_tokens);

        let response = self.complete(request).await?;
        parse_classification(&response)
    }

    /// Classify through the LLM only, surfacing any failure.
    ///
    /// Used for health probes where a silent fallback would hide an outage.
    pub async fn try_classify(&self, text: &str) -> Result<ClassificationResult> {
        let started = Instant::now();
        let parsed = self.request_classification(text).await?;
        Ok(self.finish(parsed, elapsed_ms(started)))
    }

    /// Classify an inquiry. Never fails: any LLM or parsing error degrades to the
    /// keyword fallback, with the error text kept for diagnostics.
    pub async fn classify(&self, text: &str) -> ClassificationResult {
        let started = Instant::now();

        match self.request_classification(text).await {
            Ok(parsed) => self.finish(parsed, elapsed_ms(started)),
            Err(e) => {
                let latency_ms = elapsed_ms(started);
                let error = format!("{:#}", e);
                warn!(
                    "LLM intent classification failed: {}. Falling back to keyword rules.",
                    error
                );
                let result = fallback(text, latency_ms, &error);
                info!(
                    intent = %result.intent,
                    confidence = result.confidence,
                    latency_ms,
                    fallback = true,
                    "classification_result"
                );
                result
            }
        }
    }

    /// Validate, then run the legacy keyword baseline and the LLM classifier side by side.
    pub async fn compare(&self, text: &str) -> Result<ClassificationComparison, IntentError> {
        let text = validate_input(text)?;
        let traditional = simulate_traditional_nlp(text);
        let llm = self.classify(text).await;
        Ok(ClassificationComparison { traditional, llm })
    }

    fn finish(&self, parsed: ParsedClassification, latency_ms: u64) -> ClassificationResult {
        let result = ClassificationResult {
            intent: parsed.intent().to_string(),
            confidence: parsed.confidence(),
            reasoning: parsed.reasoning().to_string(),
            latency_ms,
        };

        if !self.definitions.contains(&result.intent) {
            warn!("LLM returned unknown intent '{}'", result.intent);
        }
        info!(
            intent = %result.intent,
            confidence = result.confidence,
            latency_ms,
            fallback = false,
            "classification_result"
        );

        result
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
