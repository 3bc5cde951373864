use anyhow::{Context, Result};
use peitho_intent::{ClassifierConfig, IntentDefinitions};
use peitho_llm::LLMConfig;
use std::path::PathBuf;
use std::time::Duration;

const API_KEY_PREFIX: &str = "sk-or-v1-";

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:3002",
    "https://peitho.dev",
    "https://peitho-demo.vercel.app",
];

/// Process-wide configuration, read once at start-up and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub http_referer: Option<String>,
    pub app_title: Option<String>,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// JSON object file replacing the built-in intent set
    pub intent_definitions_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyStatus {
    Missing,
    /// Redacted in the environment (e.g. `****`); accepted as-is
    Masked,
    Valid,
    InvalidFormat,
}

impl ApiKeyStatus {
    pub fn is_usable(self) -> bool {
        matches!(self, ApiKeyStatus::Masked | ApiKeyStatus::Valid)
    }

    /// Value reported as `apiKeyFormat` by the health endpoint
    pub fn format_label(self) -> &'static str {
        match self {
            ApiKeyStatus::Masked | ApiKeyStatus::Valid => "valid",
            ApiKeyStatus::Missing | ApiKeyStatus::InvalidFormat => "invalid",
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let llm = LLMConfig::default();
        Self {
            api_key: llm.api_key,
            base_url: llm.base_url,
            model: llm.model,
            timeout_secs: llm.timeout_secs,
            http_referer: Some("https://peitho.dev".to_string()),
            app_title: Some("Peitho Backend".to_string()),
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            intent_definitions_file: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid port: {}", raw))?,
            None => defaults.port,
        };

        let timeout_secs = match lookup("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid LLM_TIMEOUT_SECS: {}", raw))?,
            None => defaults.timeout_secs,
        };

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.cors_origins,
        };

        // An explicitly empty header variable disables that header
        let optional = |key: &str, default: Option<String>| match lookup(key) {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => default,
        };

        Ok(Self {
            api_key: lookup("OPENROUTER_API_KEY").unwrap_or_default(),
            base_url: lookup("OPENROUTER_BASE_URL").unwrap_or(defaults.base_url),
            model: lookup("OPENROUTER_MODEL").unwrap_or(defaults.model),
            timeout_secs,
            http_referer: optional("LLM_HTTP_REFERER", defaults.http_referer),
            app_title: optional("LLM_APP_TITLE", defaults.app_title),
            host: lookup("API_HOST").unwrap_or(defaults.host),
            port,
            cors_origins,
            intent_definitions_file: lookup("INTENT_DEFINITIONS_FILE").map(PathBuf::from),
        })
    }

    pub fn api_key_status(&self) -> ApiKeyStatus {
        if self.api_key.is_empty() {
            ApiKeyStatus::Missing
        } else if self.api_key.starts_with('*') {
            ApiKeyStatus::Masked
        } else if self.api_key.starts_with(API_KEY_PREFIX) {
            ApiKeyStatus::Valid
        } else {
            ApiKeyStatus::InvalidFormat
        }
    }

    pub fn validate_environment(&self) -> bool {
        self.api_key_status().is_usable()
    }

    pub fn llm_config(&self) -> LLMConfig {
        let mut extra_headers = Vec::new();
        if let Some(referer) = &self.http_referer {
            extra_headers.push(("HTTP-Referer".to_string(), referer.clone()));
        }
        if let Some(title) = &self.app_title {
            extra_headers.push(("X-Title".to_string(), title.clone()));
        }

        LLMConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            extra_headers,
        }
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            request_timeout: Duration::from_secs(self.timeout_secs),
            ..ClassifierConfig::default()
        }
    }

    pub fn intent_definitions(&self) -> Result<IntentDefinitions> {
        match &self.intent_definitions_file {
            Some(path) => IntentDefinitions::load(path),
            None => Ok(IntentDefinitions::default()),
        }
    }
}
