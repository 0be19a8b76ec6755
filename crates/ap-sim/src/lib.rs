//! `ap-sim` — the per-facility stochastic simulation engine.
//!
//! # Tick phases
//!
//! ```text
//! tick(now, commands):
//!   ① Traffic    — time-of-day bucket + jitter → external traffic level.
//!   ② Sampling   — Bernoulli arrival trials (bounded) and one departure
//!                  trial per occupied space, probabilities shaped by price
//!                  and remaining capacity.
//!   ③ Departures — applied first, freeing capacity within the same tick.
//!   ④ Admission  — per arriving vehicle: enter, queue, or reject,
//!                  depending on gate state and remaining space.
//!   ⑤ Drain      — while the gate is open and space remains, queued
//!                  vehicles enter one by one.
//!   ⑥ Attrition  — occasionally a few queued vehicles give up.
//!   ⑦ Commands   — buffered control commands are applied (price clamp,
//!                  gate set, redirect target).
//!   ⑧ Emit       — a TelemetrySnapshot of the resulting state.
//! ```
//!
//! The engine is transport-free and clock-free: the caller passes `now` and
//! the batch of commands received since the previous tick, and gets the
//! snapshot back.  All randomness comes from the engine's own seeded
//! [`LotRng`][ap_core::LotRng], so a fixed seed replays a facility exactly.

pub mod engine;
pub mod error;
mod traffic;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use engine::LotEngine;
pub use error::{SimError, SimResult};
