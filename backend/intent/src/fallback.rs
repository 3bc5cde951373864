//! Rule-based classification used when the LLM path fails.
//!
//! Rules are checked in order and the first match wins. The order encodes business
//! priority (bereavement before escalation before regulatory, and so on), so it must
//! not be re-sorted by confidence or name.
//!
//! A phrase made only of ASCII characters matches case-insensitively ("Supervisor",
//! "HIBOR"/"hibor"); a phrase with any non-ASCII character is a case-sensitive
//! substring match ("P按轉H按", "transfer畀supervisor").

use crate::response::{DEFAULT_CONFIDENCE, DEFAULT_INTENT};
use crate::ClassificationResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackRule {
    pub phrases: &'static [&'static str],
    pub intent: &'static str,
    pub confidence: f32,
    pub reasoning: &'static str,
}

impl FallbackRule {
    /// `lowered` must be `text.to_ascii_lowercase()`
    fn matches(&self, text: &str, lowered: &str) -> bool {
        self.phrases
            .iter()
            .any(|phrase| phrase_matches(phrase, text, lowered))
    }
}

fn phrase_matches(phrase: &str, text: &str, lowered: &str) -> bool {
    if phrase.is_ascii() {
        lowered.contains(&phrase.to_ascii_lowercase())
    } else {
        text.contains(phrase)
    }
}

pub const FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        phrases: &["過咗身", "過世"],
        intent: "deceased_account_services",
        confidence: 0.95,
        reasoning: "Customer mentioned bereavement, needs specialized support",
    },
    FallbackRule {
        phrases: &["supervisor", "經理", "transfer畀supervisor"],
        intent: "escalation_to_supervisor",
        confidence: 0.92,
        reasoning: "Multiple failed attempts with polite frustration indicates escalation need",
    },
    FallbackRule {
        phrases: &["crypto", "virtual asset", "金管局"],
        intent: "regulatory_compliance_crypto",
        confidence: 0.88,
        reasoning: "HKMA regulatory concern about cryptocurrency",
    },
    FallbackRule {
        phrases: &["P按轉H按", "HIBOR", "prime rate"],
        intent: "mortgage_refinance_hibor_prime",
        confidence: 0.89,
        reasoning: "Technical mortgage refinancing request with rate cap concerns",
    },
    FallbackRule {
        phrases: &["overdue", "交咗錢", "already"],
        intent: "payment_dispute_escalation",
        confidence: 0.87,
        reasoning: "Payment dispute with frustration, needs escalation",
    },
];

/// First rule in `rules` matching `text`
fn first_match<'a>(rules: &'a [FallbackRule], text: &str) -> Option<&'a FallbackRule> {
    // Only ASCII letters fold; everything else is compared verbatim
    let lowered = text.to_ascii_lowercase();
    rules.iter().find(|rule| rule.matches(text, &lowered))
}

/// Classify `text` without the LLM. Never fails.
///
/// `error` is the upstream failure; it only shows up in the reasoning of the
/// no-match result.
pub fn fallback(text: &str, latency_ms: u64, error: &str) -> ClassificationResult {
    match first_match(FALLBACK_RULES, text) {
        Some(rule) => ClassificationResult {
            intent: rule.intent.to_string(),
            confidence: rule.confidence,
            reasoning: rule.reasoning.to_string(),
            latency_ms,
        },
        None => ClassificationResult {
            intent: DEFAULT_INTENT.to_string(),
            confidence: DEFAULT_CONFIDENCE,
            reasoning: format!("Unable to determine specific intent. API Error: {}", error),
            latency_ms,
        },
    }
}
