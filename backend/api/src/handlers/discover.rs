use axum::{extract::State, http::StatusCode, Json};
use peitho_intent::EmergingIntentSuggestion;
use serde::Serialize;
use std::sync::Arc;

use super::AppState;

const ANALYSIS_WINDOW: &str = "Last 30 days";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverResponse {
    pub emerging_intents: Vec<EmergingIntentSuggestion>,
    pub analysis_date: String,
    pub total_unclassified_queries: usize,
    pub analysis_window: &'static str,
}

/// Ask the LLM to propose new intents from recent unclassified queries
pub async fn discover_emerging_intents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DiscoverResponse>, (StatusCode, String)> {
    let emerging_intents = state
        .classifier
        .discover(&state.unclassified_queries)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(DiscoverResponse {
        emerging_intents,
        analysis_date: chrono::Utc::now().to_rfc3339(),
        total_unclassified_queries: state.unclassified_queries.len(),
        analysis_window: ANALYSIS_WINDOW,
    }))
}
