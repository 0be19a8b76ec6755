//! `ap-control` — the autonomic control loop.
//!
//! One shared cycle runs across all known facilities at a fixed interval.
//! Per cycle the [`Controller`]:
//!
//! 1. recomputes system-wide metrics over the telemetry cache,
//! 2. per facility, runs the phase pipeline — [`analyze`] (pure state
//!    evaluation), [`plan`] (cooldown gate + conflict resolution),
//!    [`execute`] (command materialization) — and collects the resulting
//!    decisions and commands.
//!
//! The controller never touches the transport or the store itself: it
//! returns a [`CycleOutput`] and leaves publishing and persistence to the
//! runtime, so every phase stays a deterministic function of cached state
//! and is testable without any I/O.
//!
//! | Module       | Responsibility                                         |
//! |--------------|--------------------------------------------------------|
//! | `analyze`    | Issue detection: occupancy bands, queue, gate, prices  |
//! | `plan`       | Cooldown gate, conflict resolution, decision assembly  |
//! | `execute`    | Per-action command parameters, cooldown stamping       |
//! | `metrics`    | System-wide aggregation over the cache                 |
//! | `controller` | Cycle orchestration with per-facility fault isolation  |

pub mod analyze;
pub mod controller;
pub mod error;
pub mod execute;
pub mod metrics;
pub mod plan;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use analyze::{Analysis, analyze};
pub use controller::{Controller, CycleOutput, ExecutedDecision};
pub use error::{ControlError, ControlResult};
pub use execute::execute;
pub use metrics::compute_metrics;
pub use plan::plan;
