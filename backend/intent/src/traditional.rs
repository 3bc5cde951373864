use serde::{Deserialize, Serialize};

/// Output of the keyword-matching baseline shown next to the LLM result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraditionalNLPResult {
    pub intent: String,
    pub confidence: f32,
    /// What a legacy matcher gets wrong for this kind of inquiry
    pub issues: String,
}

// (keyword, intent, confidence, issues)
const KEYWORDS: &[(&str, &str, f32, &str)] = &[
    (
        "payment",
        "payment_inquiry",
        0.6,
        "Cannot handle multilingual context",
    ),
    (
        "card",
        "card_issue",
        0.5,
        "Misses emotional context and code-switching",
    ),
    (
        "mortgage",
        "mortgage_general",
        0.4,
        "Too generic, lacks specificity",
    ),
    (
        "supervisor",
        "general_inquiry",
        0.3,
        "Fails to detect escalation need in polite language",
    ),
    (
        "account",
        "account_inquiry",
        0.5,
        "Cannot understand sensitive context",
    ),
];

/// Simulate a legacy keyword router. First keyword hit wins.
pub fn simulate_traditional_nlp(text: &str) -> TraditionalNLPResult {
    let lowered = text.to_lowercase();

    for (keyword, intent, confidence, issues) in KEYWORDS {
        if lowered.contains(keyword) {
            return TraditionalNLPResult {
                intent: intent.to_string(),
                confidence: *confidence,
                issues: issues.to_string(),
            };
        }
    }

    TraditionalNLPResult {
        intent: "insufficient_context".to_string(),
        confidence: 0.2,
        issues: "Cannot handle multilingual input or understand context".to_string(),
    }
}
