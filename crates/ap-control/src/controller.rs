//! Cycle orchestration: one controller owns the knowledge base and the
//! cooldown map, and turns cached telemetry into decisions and commands.

use std::collections::BTreeMap;

use ap_core::{
    AdaptationDecision, AdaptationThresholds, ControlCommand, LotConfig, LotId, SystemMetrics,
    TelemetrySnapshot, Timestamp,
};
use ap_knowledge::KnowledgeBase;
use tracing::{debug, warn};

use crate::analyze::analyze;
use crate::error::{ControlError, ControlResult};
use crate::execute::execute;
use crate::metrics::compute_metrics;
use crate::plan::plan;

/// One executed decision together with the commands it produced.
#[derive(Clone, Debug)]
pub struct ExecutedDecision {
    pub decision: AdaptationDecision,
    pub commands: Vec<ControlCommand>,
}

/// Everything one control cycle produced.  The runtime publishes the
/// metrics and commands and persists the decisions; the controller itself
/// performs no I/O.
#[derive(Clone, Debug, Default)]
pub struct CycleOutput {
    /// `None` until telemetry from at least one facility has arrived.
    pub metrics: Option<SystemMetrics>,
    pub decisions: Vec<ExecutedDecision>,
}

/// The autonomic controller.
///
/// Owns the [`KnowledgeBase`] (single writer: telemetry is ingested on the
/// control task's own thread) and the per-facility cooldown map.
pub struct Controller {
    knowledge: KnowledgeBase,
    cooldowns: BTreeMap<LotId, Timestamp>,
}

impl Controller {
    pub fn new(configs: Vec<LotConfig>, thresholds: AdaptationThresholds) -> Self {
        Self { knowledge: KnowledgeBase::new(configs, thresholds), cooldowns: BTreeMap::new() }
    }

    /// Monitor phase: record one inbound telemetry snapshot.
    pub fn ingest(&mut self, snapshot: TelemetrySnapshot) {
        self.knowledge.store_snapshot(snapshot);
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Timestamp of the last executed adaptation for a facility, if any.
    pub fn last_adaptation(&self, lot: &LotId) -> Option<Timestamp> {
        self.cooldowns.get(lot).copied()
    }

    /// Run one full control cycle at time `now`.
    ///
    /// Metrics are recomputed first, then each known facility goes through
    /// analyze → plan → execute.  A facility with no registered config is
    /// logged and skipped; the rest of the cycle proceeds.
    pub fn run_cycle(&mut self, now: Timestamp) -> CycleOutput {
        let metrics =
            compute_metrics(self.knowledge.all_latest(), self.knowledge.thresholds(), now);

        if metrics.is_none() {
            debug!("control cycle: no telemetry yet");
            return CycleOutput::default();
        }

        let mut decisions = Vec::new();

        let lots: Vec<LotId> = self.knowledge.all_latest().keys().cloned().collect();
        for lot in lots {
            match self.facility_cycle(&lot, now) {
                Ok(Some(executed)) => {
                    // One stamp per decision, regardless of how many
                    // commands it produced.
                    self.cooldowns.insert(lot, now);
                    decisions.push(executed);
                }
                Ok(None) => {}
                // A faulty facility is skipped; the cycle goes on.
                Err(e) => warn!(lot = %lot, error = %e, "facility cycle skipped"),
            }
        }

        CycleOutput { metrics, decisions }
    }

    /// Analyze → plan → execute for one facility.
    fn facility_cycle(&self, lot: &LotId, now: Timestamp) -> ControlResult<Option<ExecutedDecision>> {
        let Some(snapshot) = self.knowledge.latest(lot) else { return Ok(None) };
        let config = self
            .knowledge
            .lot_config(lot)
            .ok_or_else(|| ControlError::UnknownLot(lot.clone()))?;
        let thresholds = self.knowledge.thresholds();

        let Some(analysis) = analyze(snapshot, config, thresholds) else { return Ok(None) };
        debug!(lot = %lot, issues = analysis.issues.len(), "analysis found issues");

        let Some(decision) =
            plan(&analysis, &self.cooldowns, thresholds.adaptation_cooldown_secs, now)
        else {
            return Ok(None);
        };

        let commands = execute(&decision, config, thresholds, self.knowledge.all_latest());
        Ok(Some(ExecutedDecision { decision, commands }))
    }
}
