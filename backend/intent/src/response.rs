//! Parsing of raw completion text into structured payloads

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

const FENCE: &str = "```";

pub const DEFAULT_INTENT: &str = "insufficient_context";
pub const DEFAULT_CONFIDENCE: f32 = 0.3;
pub const DEFAULT_REASONING: &str = "Classification completed";

/// Return the payload of a markdown code fence, or the trimmed text if there is none.
///
/// A language tag after the opening fence (```` ```json ````, ```` ``` json ````) is
/// dropped, and prose before the fence is ignored. The payload runs to the last fence,
/// or to the end of the text when the fence is unterminated.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find(FENCE) else {
        return trimmed;
    };

    // Drop the language tag, if any
    let body = trimmed[start + FENCE.len()..]
        .trim_start_matches([' ', '\t'])
        .trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let body = match body.rfind(FENCE) {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

/// Deserialize the reply as-is, falling back to the fenced payload.
///
/// Well-formed JSON is never fence-stripped, so backticks inside its strings survive.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }

    let payload = strip_code_fence(text);
    serde_json::from_str(payload)
        .with_context(|| format!("LLM response is not valid JSON: {}", truncate(payload, 200)))
}

/// Classification fields as returned by the model; every field may be absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedClassification {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl ParsedClassification {
    pub fn intent(&self) -> &str {
        self.intent.as_deref().unwrap_or(DEFAULT_INTENT)
    }

    /// Clamped into [0, 1]
    pub fn confidence(&self) -> f32 {
        match self.confidence {
            Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
            _ => DEFAULT_CONFIDENCE,
        }
    }

    pub fn reasoning(&self) -> &str {
        self.reasoning.as_deref().unwrap_or(DEFAULT_REASONING)
    }
}

pub fn parse_classification(text: &str) -> Result<ParsedClassification> {
    let value: Value = parse_json(text)?;
    if !value.is_object() {
        anyhow::bail!("LLM response is not a JSON object");
    }
    serde_json::from_value(value).context("LLM response has unexpected field types")
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str =
        r#"{"intent":"mpf_consolidation","confidence":0.7,"reasoning":"ok"}"#;

    #[test]
    fn test_plain_json() {
        let parsed = parse_classification(PAYLOAD).unwrap();
        assert_eq!(parsed.intent(), "mpf_consolidation");
        assert_eq!(parsed.confidence(), 0.7);
        assert_eq!(parsed.reasoning(), "ok");
    }

    #[test]
    fn test_fence_with_and_without_language_tag() {
        let plain = parse_classification(PAYLOAD).unwrap();
        let tagged = parse_classification(&format!("```json\n{}\n```", PAYLOAD)).unwrap();
        let untagged = parse_classification(&format!("```\n{}\n```", PAYLOAD)).unwrap();
        let one_line = parse_classification(&format!("```json{}```", PAYLOAD)).unwrap();

        assert_eq!(plain, tagged);
        assert_eq!(plain, untagged);
        assert_eq!(plain, one_line);
    }

    #[test]
    fn test_backticks_inside_json_strings() {
        let plain = r#"{"intent":"mpf_consolidation","confidence":0.7,"reasoning":"customer pasted ```code``` in chat"}"#;
        let parsed = parse_classification(plain).unwrap();
        assert_eq!(parsed.intent(), "mpf_consolidation");
        assert_eq!(parsed.reasoning(), "customer pasted ```code``` in chat");

        let fenced = parse_classification(&format!("```json\n{}\n```", plain)).unwrap();
        assert_eq!(parsed, fenced);
    }

    #[test]
    fn test_language_tag_after_space() {
        let spaced = parse_classification(&format!("``` json\n{}\n```", PAYLOAD)).unwrap();
        assert_eq!(spaced, parse_classification(PAYLOAD).unwrap());
        assert_eq!(strip_code_fence("```\tjson\n[1]\n```"), "[1]");
    }

    #[test]
    fn test_prose_before_fence() {
        let text = "Sure! ```json\n{\"intent\":\"mpf_consolidation\",\"confidence\":0.7,\"reasoning\":\"ok\"}\n```";
        let parsed = parse_classification(text).unwrap();
        assert_eq!(parsed.intent(), "mpf_consolidation");
        assert_eq!(parsed.confidence(), 0.7);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed = parse_classification("{}").unwrap();
        assert_eq!(parsed.intent(), "insufficient_context");
        assert_eq!(parsed.confidence(), 0.3);
        assert_eq!(parsed.reasoning(), "Classification completed");

        let parsed = parse_classification(r#"{"intent": "fraud_verification_urgent"}"#).unwrap();
        assert_eq!(parsed.intent(), "fraud_verification_urgent");
        assert_eq!(parsed.confidence(), 0.3);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let parsed = parse_classification(r#"{"confidence": 1.7}"#).unwrap();
        assert_eq!(parsed.confidence(), 1.0);
        let parsed = parse_classification(r#"{"confidence": -0.2}"#).unwrap();
        assert_eq!(parsed.confidence(), 0.0);
    }

    #[test]
    fn test_malformed_responses_are_errors() {
        assert!(parse_classification("I think this is about a mortgage.").is_err());
        assert!(parse_classification("```json\n{\"intent\": \n```").is_err());
        assert!(parse_classification(r#"["not", "an", "object"]"#).is_err());
        assert!(parse_classification("[]").is_err());
        assert!(parse_classification(r#"{"confidence": "high"}"#).is_err());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("過咗身過咗身", 3), "過咗身...");
        assert_eq!(truncate("short", 10), "short");
    }
}
