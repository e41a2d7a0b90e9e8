//! Domain-level error type shared across crates.

use crate::types::DbId;

/// Errors produced by domain logic and surfaced through the API layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity does not exist, or is not visible to the caller. Ownership
    /// failures map here too so existence is never leaked.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"Story"`.
        entity: &'static str,
        /// The id that was looked up.
        id: DbId,
    },

    /// Input failed domain validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No authenticated principal.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The computed chapter cost exceeds the caller's coin balance.
    /// Carries both numbers so the client can explain the shortfall.
    #[error("Insufficient coins: cost {cost}, balance {balance}")]
    InsufficientCoins {
        /// Coins the requested chapter would cost.
        cost: i64,
        /// The caller's current balance.
        balance: i64,
    },

    /// The text generator violated its paragraph-array output contract.
    #[error("Malformed generation output: {0}")]
    MalformedGenerationOutput(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
