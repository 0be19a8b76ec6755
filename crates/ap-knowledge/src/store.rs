//! The `TimeSeriesStore` trait — the persistence collaborator's contract.

use ap_core::{AdaptationDecision, SystemMetrics, TelemetrySnapshot};

use crate::StoreResult;

/// Write side of the time-series store.
///
/// All writes are fire-and-forget from the control loop's perspective: the
/// caller logs a failure and proceeds — the in-memory cache, not the store,
/// is what decisions are made from.  Implementations must therefore never
/// block for long.
pub trait TimeSeriesStore: Send {
    /// Append one telemetry snapshot.
    fn store_snapshot(&mut self, snapshot: &TelemetrySnapshot) -> StoreResult<()>;

    /// Append one executed adaptation decision (write-once, never mutated).
    fn store_decision(&mut self, decision: &AdaptationDecision) -> StoreResult<()>;

    /// Append one system-wide metrics record.
    fn store_metrics(&mut self, metrics: &SystemMetrics) -> StoreResult<()>;
}

/// A [`TimeSeriesStore`] that discards everything.  The default when no
/// persistence collaborator is configured.
pub struct NoopStore;

impl TimeSeriesStore for NoopStore {
    fn store_snapshot(&mut self, _snapshot: &TelemetrySnapshot) -> StoreResult<()> {
        Ok(())
    }

    fn store_decision(&mut self, _decision: &AdaptationDecision) -> StoreResult<()> {
        Ok(())
    }

    fn store_metrics(&mut self, _metrics: &SystemMetrics) -> StoreResult<()> {
        Ok(())
    }
}
