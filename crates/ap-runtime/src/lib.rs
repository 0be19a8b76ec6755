//! `ap-runtime` — concurrency and lifecycle for a single-process deployment.
//!
//! One periodic task per facility plus one for the control loop, each on its
//! own thread.  Tasks never call each other: engines publish telemetry on the
//! bus, the control task publishes commands back, and the knowledge base
//! lives entirely inside the control task's thread.
//!
//! | Module    | Responsibility                                            |
//! |-----------|-----------------------------------------------------------|
//! | `signal`  | Shared stop flag checked once per task iteration          |
//! | `task`    | `LotTask` and `ControlTask` periodic bodies               |
//! | `system`  | Builder, thread spawning, bounded shutdown                |
//!
//! Every task body is also callable one iteration at a time (no threads, no
//! sleeps), which is how the unit tests drive it.

pub mod error;
pub mod signal;
pub mod system;
pub mod task;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{RuntimeError, RuntimeResult};
pub use signal::StopSignal;
pub use system::{RunningSystem, System, SystemBuilder};
pub use task::{ControlTask, LotTask};
