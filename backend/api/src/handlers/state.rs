use peitho_intent::IntentClassifier;
use std::sync::Arc;

use crate::config::Settings;

pub struct AppState {
    pub classifier: IntentClassifier,
    pub settings: Arc<Settings>,
    /// Queries handed to the discovery endpoint
    pub unclassified_queries: Vec<String>,
}
