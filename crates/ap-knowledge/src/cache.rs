//! The in-memory knowledge base read by the control loop every cycle.

use std::collections::BTreeMap;

use ap_core::{AdaptationThresholds, LotConfig, LotId, TelemetrySnapshot};
use tracing::debug;

/// Latest telemetry per facility plus the static decision inputs
/// (facility configs and adaptation thresholds).
///
/// Exclusively owned by the control task: telemetry arrives on a channel
/// and is stored here once per cycle, so there is exactly one writer and
/// no lock.  Snapshot writes are whole-value replacements — a reader never
/// observes a half-updated entry, only a possibly stale one.
///
/// `BTreeMap` keeps iteration order deterministic; the redirect-target
/// scan and the metrics aggregation depend on a stable order.
pub struct KnowledgeBase {
    snapshots: BTreeMap<LotId, TelemetrySnapshot>,
    configs: BTreeMap<LotId, LotConfig>,
    thresholds: AdaptationThresholds,
}

impl KnowledgeBase {
    pub fn new(configs: Vec<LotConfig>, thresholds: AdaptationThresholds) -> Self {
        let configs = configs.into_iter().map(|c| (c.id.clone(), c)).collect();
        Self { snapshots: BTreeMap::new(), configs, thresholds }
    }

    // ── Telemetry cache ───────────────────────────────────────────────────

    /// Record the latest snapshot for its facility.
    ///
    /// Last-write-wins by arrival order — the embedded timestamp is not
    /// consulted, matching the at-least-once, unordered delivery contract.
    pub fn store_snapshot(&mut self, snapshot: TelemetrySnapshot) {
        debug!(
            lot = %snapshot.lot_id,
            occupancy_pct = snapshot.occupancy_percentage,
            "telemetry cached"
        );
        self.snapshots.insert(snapshot.lot_id.clone(), snapshot);
    }

    /// Latest known snapshot for one facility.
    pub fn latest(&self, lot: &LotId) -> Option<&TelemetrySnapshot> {
        self.snapshots.get(lot)
    }

    /// All latest snapshots, in stable (sorted) facility order.
    pub fn all_latest(&self) -> &BTreeMap<LotId, TelemetrySnapshot> {
        &self.snapshots
    }

    /// Number of facilities seen so far.
    pub fn known_lots(&self) -> usize {
        self.snapshots.len()
    }

    // ── Static inputs ─────────────────────────────────────────────────────

    pub fn lot_config(&self, lot: &LotId) -> Option<&LotConfig> {
        self.configs.get(lot)
    }

    pub fn thresholds(&self) -> &AdaptationThresholds {
        &self.thresholds
    }
}
