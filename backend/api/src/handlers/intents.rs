use axum::{extract::State, Json};
use peitho_intent::IntentDefinition;
use serde::Serialize;
use std::sync::Arc;

use super::AppState;

#[derive(Serialize)]
pub struct IntentsResponse {
    pub intents: Vec<IntentDefinition>,
}

/// List the intent definitions the classifier chooses from
pub async fn list_intents(State(state): State<Arc<AppState>>) -> Json<IntentsResponse> {
    Json(IntentsResponse {
        intents: state.classifier.definitions().iter().cloned().collect(),
    })
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub health: &'static str,
    pub intents: &'static str,
}

pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Peitho Backend API",
        version: env!("CARGO_PKG_VERSION"),
        health: "/health",
        intents: "/intents",
    })
}
