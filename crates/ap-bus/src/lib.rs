//! `ap-bus` — the transport boundary of the autopark workspace.
//!
//! The real broker (MQTT-compatible) is an external collaborator; this crate
//! specifies its contract and nothing more:
//!
//! - [`topic`] — the topic scheme and the single/multi-level wildcard
//!   matcher brokers use for subscription filters.
//! - [`MessageBus`] — object-safe publish/subscribe seam.  Publishing is
//!   fire-and-forget; subscribing yields an `mpsc::Receiver` the consumer
//!   drains once per tick/cycle.
//! - [`MemoryBus`] — in-process reference implementation used by tests and
//!   single-process deployments.
//! - [`codec`] — JSON encode/decode for the wire types in `ap-core`.
//!
//! An adapter for a real broker implements [`MessageBus`] in the application
//! crate; nothing in the core knows the difference.

pub mod bus;
pub mod codec;
pub mod error;
pub mod topic;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bus::{MemoryBus, Message, MessageBus};
pub use codec::{decode, encode};
pub use error::{BusError, BusResult};
