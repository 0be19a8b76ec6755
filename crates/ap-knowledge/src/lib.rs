//! `ap-knowledge` — the knowledge component of the control loop.
//!
//! Two layers with very different service levels:
//!
//! - [`KnowledgeBase`] — the in-memory cache the control loop reads every
//!   cycle: latest snapshot per facility (last-write-wins by arrival
//!   order), facility configs, and adaptation thresholds.  Always
//!   available, never blocks.
//! - [`TimeSeriesStore`] — the persistence collaborator's contract.
//!   Writes are best-effort: a failure is logged by the caller and the
//!   control cadence proceeds on the in-memory cache alone.
//!
//! # Cargo features
//!
//! | Feature  | Effect                                                   |
//! |----------|----------------------------------------------------------|
//! | `sqlite` | [`SqliteStore`] backend with history queries.            |

pub mod cache;
pub mod error;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cache::KnowledgeBase;
pub use error::{StoreError, StoreResult};
pub use store::{NoopStore, TimeSeriesStore};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
