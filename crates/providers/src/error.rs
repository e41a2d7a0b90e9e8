//! Provider error type.

/// Errors from external generation capabilities.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport-level failure reaching the provider.
    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The paragraph-array output contract was violated. This is a hard
    /// failure surfaced to the caller, never recovered best-effort.
    #[error("Malformed generation output: {0}")]
    MalformedOutput(String),

    /// The response parsed but did not contain the expected payload.
    #[error("Provider response missing data: {0}")]
    MissingData(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
