use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use peitho_intent::{unclassified_queries, IntentClassifier};
use peitho_llm::ChatCompletionClient;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::handlers::{
    classify_intent, discover_emerging_intents, health_check, list_intents, root_handler,
    AppState,
};

/// Compact logs on stderr, `RUST_LOG` overriding the default `info` level
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false) // Remove module path
        .with_file(true)
        .with_line_number(true)
        .compact()
        .init();
}

/// Build the classifier from settings
pub fn build_classifier(settings: &Settings) -> Result<IntentClassifier> {
    let definitions = settings.intent_definitions()?;
    info!(
        "Loaded {} intent definitions{}",
        definitions.len(),
        settings
            .intent_definitions_file
            .as_ref()
            .map(|p| format!(" from {}", p.display()))
            .unwrap_or_default()
    );

    let backend = ChatCompletionClient::new(settings.llm_config())
        .context("Failed to initialize LLM client")?;

    Ok(IntentClassifier::new(Arc::new(backend), definitions)
        .with_config(settings.classifier_config()))
}

pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/intents", get(list_intents))
        .route("/classify", post(classify_intent))
        .route("/discover", get(discover_emerging_intents))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(settings: Settings) -> Result<()> {
    info!("Peitho Backend starting on {}:{}...", settings.host, settings.port);

    if !settings.validate_environment() {
        warn!(
            "OPENROUTER_API_KEY is missing or malformed; classification will use keyword fallback"
        );
    }

    let classifier = build_classifier(&settings)?;
    info!("Using model {}", classifier.model());

    let cors = cors_layer(&settings.cors_origins)?;
    let host = settings.host.clone();
    let port = settings.port;

    let app_state = Arc::new(AppState {
        classifier,
        settings: Arc::new(settings),
        unclassified_queries: unclassified_queries(),
    });

    let app = build_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    info!("listening on {}", listener.local_addr()?);
    info!("Health check: http://{}:{}/health", host, port);
    axum::serve(listener, app).await?;

    Ok(())
}
