use crate::definitions::IntentDefinitions;

const USER_PREFIX: &str = "Classify this Hong Kong bank inquiry: ";

/// System instruction for closed-set classification
pub fn classification_system_prompt(definitions: &IntentDefinitions) -> String {
    format!(
        r#"You are an expert intent classifier for Hong Kong bank customer service.

Classify customer inquiries into these intents:
{}

Respond ONLY with valid JSON in this exact format:
{{
  "intent": "intent_key",
  "confidence": 0.85,
  "reasoning": "Brief explanation"
}}"#,
        definitions.to_prompt_json()
    )
}

/// The inquiry goes in verbatim; no sanitizing is attempted.
pub fn classification_user_message(text: &str) -> String {
    format!("{}{}", USER_PREFIX, text)
}

pub const DISCOVERY_SYSTEM_PROMPT: &str = r#"You are an expert banking analyst identifying emerging customer needs from unclassified queries.

Analyze these recent Hong Kong bank customer queries that don't fit existing intent categories. Identify patterns and suggest new intent categories that would improve customer service.

For each emerging intent pattern you identify, provide:
1. Suggested intent name
2. Number of similar queries
3. Brief description
4. Business impact/priority
5. Example queries

Respond ONLY with a JSON array, one object per emerging intent, in this exact format:
[
  {
    "name": "suggested_intent_key",
    "count": 2,
    "description": "Brief description",
    "priority": "high",
    "examples": ["example query"],
    "businessImpact": "Why this matters to the bank"
  }
]"#;

/// Numbered query list, one per line
pub fn discovery_user_message(queries: &[String]) -> String {
    let listing: Vec<String> = queries
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q))
        .collect();
    format!("Recent unclassified customer queries:\n{}", listing.join("\n"))
}
