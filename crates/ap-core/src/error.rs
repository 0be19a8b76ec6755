//! Error types for ap-core.

use thiserror::Error;

/// Errors raised by the core types themselves.  Sub-crates wrap this in
/// their own error enums via `#[from]`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;
