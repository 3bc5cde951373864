use thiserror::Error;

/// Conditions the caller of the intent service is expected to surface.
///
/// Classification itself never produces one of these; it degrades to the
/// keyword fallback instead.
#[derive(Debug, Error)]
pub enum IntentError {
    #[error("Text input is required")]
    EmptyInput,

    #[error("Intent discovery failed: {0}")]
    Discovery(String),
}

impl IntentError {
    pub(crate) fn discovery(err: anyhow::Error) -> Self {
        IntentError::Discovery(format!("{:#}", err))
    }
}
