//! Error types for ap-control.

use ap_core::LotId;
use thiserror::Error;

/// A per-facility cycle fault.  The controller logs these and skips the
/// facility for the current cycle; other facilities are unaffected.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("no configuration registered for lot '{0}'")]
    UnknownLot(LotId),
}

/// Alias for `Result<T, ControlError>`.
pub type ControlResult<T> = Result<T, ControlError>;
