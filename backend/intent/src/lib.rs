use serde::{Deserialize, Serialize};

pub mod classifier;
pub mod definitions;
pub mod discovery;
pub mod error;
pub mod fallback;
pub mod prompt;
pub mod response;
pub mod traditional;

#[cfg(test)]
mod testing;

pub use classifier::{validate_input, ClassifierConfig, IntentClassifier};
pub use definitions::{IntentDefinition, IntentDefinitions};
pub use discovery::{unclassified_queries, EmergingIntentSuggestion, UNCLASSIFIED_QUERIES};
pub use error::IntentError;
pub use fallback::{fallback, FallbackRule, FALLBACK_RULES};
pub use traditional::{simulate_traditional_nlp, TraditionalNLPResult};

/// Result of intent classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Intent key, normally one of the configured definitions
    pub intent: String,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
    pub reasoning: String,
    /// Wall-clock time spent on the LLM call and parsing
    pub latency_ms: u64,
}

/// Legacy keyword routing next to the LLM result for the same inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationComparison {
    pub traditional: TraditionalNLPResult,
    pub llm: ClassificationResult,
}
