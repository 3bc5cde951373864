use axum::{extract::State, http::StatusCode, Json};
use peitho_intent::{ClassificationComparison, IntentError};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::AppState;

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

/// Classify a customer inquiry, returning the legacy keyword result next to the LLM result
pub async fn classify_intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<ClassificationComparison>, (StatusCode, String)> {
    info!(
        text_length = req.text.chars().count(),
        "Processing classification request"
    );

    let comparison = state.classifier.compare(&req.text).await.map_err(|e| match e {
        IntentError::EmptyInput => {
            warn!("Empty text input received");
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Classification failed: {}", other),
        ),
    })?;

    info!(
        llm_intent = %comparison.llm.intent,
        llm_confidence = comparison.llm.confidence,
        latency_ms = comparison.llm.latency_ms,
        "Classification completed"
    );

    Ok(Json(comparison))
}
