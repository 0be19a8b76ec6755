//! `ap-core` — foundational types for the `autopark` workspace.
//!
//! This crate is a dependency of every other `ap-*` crate.  It intentionally
//! has no `ap-*` dependencies and minimal external ones (only `rand`,
//! `thiserror`, and `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`ids`]    | `LotId`                                                   |
//! | [`time`]   | `Timestamp` (Unix seconds, UTC hour-of-day)               |
//! | [`rng`]    | `LotRng` (per-facility deterministic RNG)                 |
//! | [`model`]  | Telemetry, command, decision, and metrics wire types      |
//! | [`config`] | Facility, threshold, and simulation parameter structs     |
//! | [`error`]  | `CoreError`, `CoreResult`                                 |

pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AdaptationThresholds, LotConfig, SimulationParams};
pub use error::{CoreError, CoreResult};
pub use ids::LotId;
pub use model::{
    AdaptationAction, AdaptationDecision, CommandParams, ControlCommand, GateState, Severity,
    SystemMetrics, TelemetrySnapshot,
};
pub use rng::LotRng;
pub use time::Timestamp;
