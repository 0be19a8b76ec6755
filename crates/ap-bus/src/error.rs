//! Error types for ap-bus.

use thiserror::Error;

/// Errors crossing the transport boundary.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    #[error("subscribe with filter '{filter}' failed: {reason}")]
    Subscribe { filter: String, reason: String },
}

/// Alias for `Result<T, BusError>`.
pub type BusResult<T> = Result<T, BusError>;
