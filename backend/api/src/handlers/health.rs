use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use super::AppState;

const PROBE_TEXT: &str = "Test";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiHealth>,
    pub environment: EnvironmentHealth,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub connected: bool,
    pub model: String,
    pub latency: String,
    /// Intent returned for the probe inquiry
    pub response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentHealth {
    pub api_key_configured: bool,
    pub api_key_format: &'static str,
}

/// Health check with a live LLM probe.
///
/// The probe bypasses the keyword fallback so an unreachable or misconfigured
/// backend is reported as unhealthy instead of being masked.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let key_status = state.settings.api_key_status();
    let environment = EnvironmentHealth {
        api_key_configured: !state.settings.api_key.is_empty(),
        api_key_format: key_status.format_label(),
    };
    let timestamp = chrono::Local::now().to_rfc3339();

    if !key_status.is_usable() {
        return (
            StatusCode::OK,
            Json(HealthResponse {
                status: "unhealthy",
                api: None,
                environment,
                timestamp,
                error: Some(
                    "Invalid environment variables: OPENROUTER_API_KEY (should start with 'sk-or-v1-')"
                        .to_string(),
                ),
            }),
        );
    }

    let started = Instant::now();
    match state.classifier.try_classify(PROBE_TEXT).await {
        Ok(result) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                api: Some(ApiHealth {
                    connected: true,
                    model: state.classifier.model().to_string(),
                    latency: format!("{}ms", started.elapsed().as_millis()),
                    response: result.intent,
                }),
                environment,
                timestamp,
                error: None,
            }),
        ),
        Err(e) => {
            let message = troubleshooting_message(&format!("{:#}", e));
            error!("Health probe failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy",
                    api: None,
                    environment,
                    timestamp,
                    error: Some(message),
                }),
            )
        }
    }
}

/// Append hints for the failures operators hit most often
fn troubleshooting_message(error: &str) -> String {
    let mut message = error.to_string();
    if error.contains("No auth credentials found") {
        message.push_str(" - Check environment variables and restart server");
    }
    if error.contains("401") {
        message.push_str(" - API key may be invalid or expired");
    }
    message
}
