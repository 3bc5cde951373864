//! Emerging-intent discovery over queries the classifier could not place.
//!
//! Unlike classification there is no deterministic substitute for open-ended
//! clustering, so every failure is returned to the caller.

use anyhow::{Context, Result};
use peitho_llm::CompletionRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::classifier::IntentClassifier;
use crate::error::IntentError;
use crate::prompt::{discovery_user_message, DISCOVERY_SYSTEM_PROMPT};
use crate::response::parse_json;

/// A new intent category proposed by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergingIntentSuggestion {
    #[serde(alias = "intent_name", alias = "suggested_intent_name")]
    pub name: String,
    /// Number of similar queries seen
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(rename = "businessImpact", alias = "business_impact", default)]
    pub business_impact: String,
}

/// Recent queries that fell outside every configured intent
pub const UNCLASSIFIED_QUERIES: &[&str] = &[
    "你哋有冇做digital yuan debit card？我想用嚟喺大陸消費",
    "想問下綠色按揭有咩優惠，係咪真係可以減息",
    "我係crypto trader，需要開business account處理Bitcoin收入",
    "聽講而家可以用手機做facial recognition開戶，點樣申請？",
    "想問下carbon offset credit card有咩rewards",
    "我想投資ESG fund但係唔知邊隻好",
    "可唔可以設定如果Bitcoin跌過某個價就自動賣",
    "聽講政府有新嘅first home buyer scheme，你哋參唔參與？",
    "我想知虛擬資產交易需要報稅嗎",
    "有冇得設定如果我個account異常交易就即刻WhatsApp我？",
];

pub fn unclassified_queries() -> Vec<String> {
    UNCLASSIFIED_QUERIES.iter().map(|q| q.to_string()).collect()
}

/// Keys checked, in order, when the suggestions come wrapped in an object
const WRAPPER_KEYS: &[&str] = &["emerging_intents", "emergingIntents", "intents"];

/// Parse a JSON array of suggestions, also accepting an object that wraps one array
/// (`{"emerging_intents": [...]}`). Known wrapper keys win over any other array field.
pub fn parse_suggestions(text: &str) -> Result<Vec<EmergingIntentSuggestion>> {
    let value: Value = parse_json(text)?;

    let array = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => {
            let known = WRAPPER_KEYS
                .iter()
                .find(|key| map.get(**key).is_some_and(Value::is_array))
                .and_then(|key| map.remove(*key));
            match known {
                Some(array) => array,
                None => map
                    .into_iter()
                    .map(|(_, v)| v)
                    .find(Value::is_array)
                    .context("Discovery response object contains no array of intents")?,
            }
        }
        _ => anyhow::bail!("Discovery response is not a JSON array"),
    };

    serde_json::from_value(array).context("Discovery response has unexpected intent fields")
}

impl IntentClassifier {
    async fn request_discovery(
        &self,
        queries: &[String],
    ) -> Result<Vec<EmergingIntentSuggestion>> {
        let request =
            CompletionRequest::new(DISCOVERY_SYSTEM_PROMPT, discovery_user_message(queries))
                .temperature(self.config().discovery_temperature)
                .max_tokens(self.config().discovery_max_tokens);

        let response = self.complete(request).await?;
        parse_suggestions(&response)
    }

    /// Ask the LLM to cluster `queries` into new intent categories.
    pub async fn discover(
        &self,
        queries: &[String],
    ) -> Result<Vec<EmergingIntentSuggestion>, IntentError> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        match self.request_discovery(queries).await {
            Ok(suggestions) => {
                info!(
                    "Discovered {} emerging intents from {} queries",
                    suggestions.len(),
                    queries.len()
                );
                Ok(suggestions)
            }
            Err(e) => {
                error!("Intent discovery error: {:#}", e);
                Err(IntentError::discovery(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::IntentDefinitions;
    use crate::testing::ScriptedBackend;
    use std::sync::Arc;

    const SUGGESTIONS: &str = r#"[
        {
            "name": "digital_yuan_services",
            "count": 1,
            "description": "e-CNY cards for mainland spending",
            "priority": "medium",
            "examples": ["你哋有冇做digital yuan debit card？"],
            "businessImpact": "Cross-border retail spend"
        },
        {
            "name": "crypto_business_banking",
            "count": 3,
            "description": "Accounts and tax questions for crypto income",
            "priority": "high",
            "examples": ["我係crypto trader"],
            "businessImpact": "Regulatory exposure"
        }
    ]"#;

    #[test]
    fn test_parse_array() {
        let suggestions = parse_suggestions(SUGGESTIONS).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[1].name, "crypto_business_banking");
        assert_eq!(suggestions[1].count, 3);
        assert_eq!(suggestions[1].business_impact, "Regulatory exposure");
    }

    #[test]
    fn test_parse_fenced_and_wrapped() {
        let fenced = format!("```json\n{}\n```", SUGGESTIONS);
        assert_eq!(parse_suggestions(&fenced).unwrap().len(), 2);

        let wrapped = format!(r#"{{"emerging_intents": {}}}"#, SUGGESTIONS);
        assert_eq!(parse_suggestions(&wrapped).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_prefers_known_wrapper_key() {
        let wrapped = format!(r#"{{"notes": [], "emerging_intents": {}}}"#, SUGGESTIONS);
        assert_eq!(parse_suggestions(&wrapped).unwrap().len(), 2);

        let camel = format!(r#"{{"notes": ["n/a"], "emergingIntents": {}}}"#, SUGGESTIONS);
        assert_eq!(parse_suggestions(&camel).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_tolerates_sparse_fields() {
        let suggestions =
            parse_suggestions(r#"[{"intent_name": "green_mortgage", "business_impact": "ESG"}]"#)
                .unwrap();
        assert_eq!(suggestions[0].name, "green_mortgage");
        assert_eq!(suggestions[0].count, 0);
        assert_eq!(suggestions[0].business_impact, "ESG");
    }

    #[test]
    fn test_parse_rejects_non_arrays() {
        assert!(parse_suggestions(r#"{"summary": "nothing"}"#).is_err());
        assert!(parse_suggestions("\"just text\"").is_err());
        assert!(parse_suggestions(r#"[{"count": 2}]"#).is_err());
    }

    #[test]
    fn test_serializes_camel_case_impact() {
        let suggestions = parse_suggestions(SUGGESTIONS).unwrap();
        let json = serde_json::to_value(&suggestions[0]).unwrap();
        assert_eq!(json["businessImpact"], "Cross-border retail spend");
    }

    #[tokio::test]
    async fn test_discover_sends_numbered_queries() {
        let backend = Arc::new(ScriptedBackend::replying(SUGGESTIONS));
        let classifier = IntentClassifier::new(backend.clone(), IntentDefinitions::default());

        let suggestions = classifier.discover(&unclassified_queries()).await.unwrap();
        assert_eq!(suggestions.len(), 2);

        let request = backend.last_request().unwrap();
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.max_tokens, 800);
        assert!(request.messages[1]
            .content
            .starts_with("Recent unclassified customer queries:\n1. 你哋有冇做digital yuan"));
        assert!(request.messages[1].content.contains("\n10. "));
    }

    #[tokio::test]
    async fn test_discover_propagates_backend_errors() {
        let backend = Arc::new(ScriptedBackend::failing("connection reset"));
        let classifier = IntentClassifier::new(backend, IntentDefinitions::default());

        let err = classifier
            .discover(&unclassified_queries())
            .await
            .unwrap_err();
        assert!(matches!(err, IntentError::Discovery(_)));
        assert_eq!(err.to_string(), "Intent discovery failed: connection reset");
    }

    #[tokio::test]
    async fn test_discover_propagates_parse_errors() {
        let backend = Arc::new(ScriptedBackend::replying("Here are some ideas: green mortgages"));
        let classifier = IntentClassifier::new(backend, IntentDefinitions::default());

        let err = classifier
            .discover(&unclassified_queries())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Intent discovery failed: "));
    }

    #[tokio::test]
    async fn test_discover_without_queries_skips_llm() {
        let backend = Arc::new(ScriptedBackend::replying(SUGGESTIONS));
        let classifier = IntentClassifier::new(backend.clone(), IntentDefinitions::default());

        assert!(classifier.discover(&[]).await.unwrap().is_empty());
        assert_eq!(backend.request_count(), 0);
    }
}
