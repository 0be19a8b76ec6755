//! Error types for ap-runtime.

use thiserror::Error;

/// Startup-time failures.  Once the system is running nothing is fatal:
/// tasks log their per-iteration failures and keep going.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation error: {0}")]
    Sim(#[from] ap_sim::SimError),

    #[error("bus error: {0}")]
    Bus(#[from] ap_bus::BusError),

    #[error("failed to spawn task thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Alias for `Result<T, RuntimeError>`.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
