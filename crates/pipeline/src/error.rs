//! Pipeline error type.

use lullaby_core::error::CoreError;
use lullaby_providers::ProviderError;

/// Request-level failures from the orchestrator. Substep failures (one
/// paragraph's audio, one image, the consistency reference, title parsing)
/// never surface here; they are caught and degraded in place.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A domain error: not found, insufficient coins, validation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persistence failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The text generator failed on the core paragraph call. Carries the
    /// malformed-output contract violation as well as transport errors.
    #[error("Text generation failed: {0}")]
    TextGeneration(ProviderError),
}

impl PipelineError {
    /// Map a paragraph-generation provider error, promoting contract
    /// violations to the domain-level malformed-output error.
    pub fn from_paragraph_error(err: ProviderError) -> Self {
        match err {
            ProviderError::MalformedOutput(msg) => {
                PipelineError::Core(CoreError::MalformedGenerationOutput(msg))
            }
            other => PipelineError::TextGeneration(other),
        }
    }
}
