use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// One intent the classifier may choose from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub key: String,
    pub description: String,
}

/// Ordered, read-only set of intent definitions rendered into the classification prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDefinitions {
    entries: Vec<IntentDefinition>,
}

const HONG_KONG_BANKING: &[(&str, &str)] = &[
    (
        "payment_dispute_escalation",
        "Customer reporting payment processing errors requiring immediate resolution",
    ),
    (
        "escalation_to_supervisor",
        "Request for supervisor intervention due to unresolved issues",
    ),
    (
        "passbook_fixed_deposit_inquiry",
        "Questions about traditional banking products (passbooks, fixed deposits)",
    ),
    (
        "mortgage_refinance_hibor_prime",
        "Mortgage refinancing between HIBOR and Prime rate products",
    ),
    (
        "deceased_account_services",
        "Account handling for deceased customers",
    ),
    (
        "debit_card_application",
        "Application for ATM/debit card (not credit card)",
    ),
    (
        "securities_margin_trading",
        "Stock trading with margin facilities",
    ),
    (
        "security_lockout_escalation",
        "Multiple security-related failures requiring urgent attention",
    ),
    (
        "wealth_management_trust_services",
        "High net worth services including trusts and estate planning",
    ),
    (
        "regulatory_compliance_crypto",
        "Questions about cryptocurrency regulations and compliance",
    ),
    (
        "remittance_limit_mainland",
        "Cross-border transfer limits to mainland China",
    ),
    (
        "investment_linked_insurance_surrender",
        "ILAS product surrender and valuation",
    ),
    (
        "sme_emergency_credit_facility",
        "Urgent business credit line requests",
    ),
    (
        "fraud_verification_urgent",
        "Potential fraud in progress requiring immediate verification",
    ),
    ("mpf_consolidation", "Mandatory Provident Fund scheme transfers"),
    (
        "insufficient_context",
        "Query too vague or lacks sufficient context for classification",
    ),
];

impl IntentDefinitions {
    /// Built-in Hong Kong retail banking intents
    pub fn hong_kong_banking() -> Self {
        Self::from_pairs(HONG_KONG_BANKING.iter().copied())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, description)| IntentDefinition {
                key: key.into(),
                description: description.into(),
            })
            .collect();
        Self { entries }
    }

    /// Parse a JSON object of `"intent_key": "description"` pairs, keeping file order.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: Map<String, Value> =
            serde_json::from_str(json).context("Intent definitions must be a JSON object")?;

        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let description = value
                .as_str()
                .with_context(|| format!("Description for intent '{}' must be a string", key))?;
            entries.push(IntentDefinition {
                key,
                description: description.to_string(),
            });
        }

        if entries.is_empty() {
            anyhow::bail!("Intent definitions must not be empty");
        }

        Ok(Self { entries })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read intent definitions from {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid intent definitions in {}", path.display()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|d| d.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntentDefinition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON object listing, as embedded in the system prompt
    pub fn to_prompt_json(&self) -> String {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|d| (d.key.clone(), Value::String(d.description.clone())))
            .collect();
        // Serializing a Map of strings cannot fail
        serde_json::to_string_pretty(&map).unwrap_or_default()
    }
}

impl Default for IntentDefinitions {
    fn default() -> Self {
        Self::hong_kong_banking()
    }
}
