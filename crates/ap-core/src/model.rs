//! The wire data model.
//!
//! These types are the JSON contract between the facility engines, the
//! control loop, and any external subscriber:
//!
//! - `parking/lot/{id}/sensors` — [`TelemetrySnapshot`]
//! - `parking/lot/{id}/control` — [`ControlCommand`]
//! - `parking/system/metrics`  — [`SystemMetrics`]
//!
//! [`AdaptationDecision`] is not published on the bus; it is written once to
//! the time-series store for audit.
//!
//! Field names and enum string values match the original broker contract
//! (`lot_id`, `gate_state: "open"|"closed"`, `action: "increase_price"`, …),
//! so a foreign dashboard subscribed to the topics keeps working.

use serde::{Deserialize, Serialize};

use crate::{LotId, Timestamp};

/// Round to 2 decimals — money and percentage fields on the wire.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ── Gate state ────────────────────────────────────────────────────────────────

/// Access-gate position.  OPEN admits arrivals directly; CLOSED routes them
/// to the queue (or rejection when the queue is full).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Open,
    Closed,
}

// ── Adaptation actions ────────────────────────────────────────────────────────

/// The closed set of corrective actions the control loop can issue.
///
/// A closed enum rather than a string tag: an invalid action is a decode
/// error at the boundary, never a silent no-op inside an engine.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationAction {
    IncreasePrice,
    DecreasePrice,
    CloseGate,
    OpenGate,
    RedirectVehicles,
    NoAction,
}

impl AdaptationAction {
    /// The snake_case tag used on the wire and in persisted action lists.
    pub fn as_str(self) -> &'static str {
        match self {
            AdaptationAction::IncreasePrice => "increase_price",
            AdaptationAction::DecreasePrice => "decrease_price",
            AdaptationAction::CloseGate => "close_gate",
            AdaptationAction::OpenGate => "open_gate",
            AdaptationAction::RedirectVehicles => "redirect_vehicles",
            AdaptationAction::NoAction => "no_action",
        }
    }
}

// ── Severity ──────────────────────────────────────────────────────────────────

/// Qualitative urgency of a detected issue.  Ordered so analysis can
/// escalate with `max`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

// ── Telemetry ─────────────────────────────────────────────────────────────────

/// One facility's sensor reading, emitted every simulation tick.
///
/// `occupancy_percentage` is always derived from occupancy and capacity —
/// construct via [`TelemetrySnapshot::from_state`] so the two can never
/// drift apart.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub lot_id: LotId,
    /// Derived: `current_occupancy / total_capacity × 100`, in `0..=100`.
    pub occupancy_percentage: f64,
    pub current_occupancy: u32,
    pub total_capacity: u32,
    pub queue_length: u32,
    /// Cumulative, monotonically non-decreasing.
    pub rejected_count: u64,
    pub current_price: f64,
    pub gate_state: GateState,
    /// Cumulative, monotonically non-decreasing.
    pub revenue: f64,
    /// External traffic intensity in `0.0..=1.0`.
    pub external_traffic_level: f64,
    pub timestamp: Timestamp,
}

impl TelemetrySnapshot {
    /// Assemble a snapshot, deriving the percentage field.
    ///
    /// A zero-capacity facility reports 0.0% rather than dividing by zero
    /// (config validation rejects capacity 0, but the wire type stays total).
    #[allow(clippy::too_many_arguments)]
    pub fn from_state(
        lot_id: LotId,
        current_occupancy: u32,
        total_capacity: u32,
        queue_length: u32,
        rejected_count: u64,
        current_price: f64,
        gate_state: GateState,
        revenue: f64,
        external_traffic_level: f64,
        timestamp: Timestamp,
    ) -> Self {
        let occupancy_percentage = if total_capacity == 0 {
            0.0
        } else {
            round2(current_occupancy as f64 / total_capacity as f64 * 100.0)
        };
        Self {
            lot_id,
            occupancy_percentage,
            current_occupancy,
            total_capacity,
            queue_length,
            rejected_count,
            current_price,
            gate_state,
            revenue: round2(revenue),
            external_traffic_level: round2(external_traffic_level),
            timestamp,
        }
    }

    /// Occupancy as a `0.0..=1.0` ratio (0.0 for zero capacity).
    #[inline]
    pub fn occupancy_ratio(&self) -> f64 {
        if self.total_capacity == 0 {
            0.0
        } else {
            self.current_occupancy as f64 / self.total_capacity as f64
        }
    }

    /// Free spaces remaining.
    #[inline]
    pub fn available_spaces(&self) -> u32 {
        self.total_capacity.saturating_sub(self.current_occupancy)
    }
}

// ── Control commands ──────────────────────────────────────────────────────────

/// Action-specific command parameters.
///
/// A closed struct rather than a free-form map: each action reads the one
/// field it understands and ignores the rest.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct CommandParams {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_lot: Option<LotId>,
}

impl CommandParams {
    pub const EMPTY: CommandParams = CommandParams { new_price: None, target_lot: None };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.new_price.is_none() && self.target_lot.is_none()
    }
}

/// A corrective command addressed to one facility's effectors.
///
/// Ephemeral: consumed once by the addressed engine, never stored.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ControlCommand {
    pub lot_id: LotId,
    pub action: AdaptationAction,
    #[serde(default)]
    pub parameters: CommandParams,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub reason: String,
}

// ── Adaptation decisions ──────────────────────────────────────────────────────

/// One executed adaptation: what triggered it, what was decided, and what
/// outcome was predicted.  Written once to the time-series store.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AdaptationDecision {
    pub lot_id: LotId,
    pub timestamp: Timestamp,
    /// Human-readable concatenation of the detected issues.
    pub trigger_condition: String,
    /// The telemetry that triggered the decision.
    pub current_state: TelemetrySnapshot,
    /// Conflict-free, in analysis order.
    pub actions: Vec<AdaptationAction>,
    pub expected_outcome: String,
    /// `0.0..=1.0`.
    pub confidence: f64,
}

// ── System metrics ────────────────────────────────────────────────────────────

/// System-wide aggregates over all known facilities.
///
/// Recomputed from the telemetry cache every control cycle — never
/// incrementally maintained, so a recompute over an unchanged cache is
/// byte-identical.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub timestamp: Timestamp,
    pub total_revenue: f64,
    pub total_occupancy: u64,
    pub total_capacity: u64,
    pub total_rejected: u64,
    pub total_queue_length: u64,
    pub average_price: f64,
    /// Facilities at ≥ 95% occupancy.
    pub lots_at_capacity: u32,
    /// Facilities below the configured low-occupancy threshold.
    pub lots_under_utilized: u32,
}

impl SystemMetrics {
    /// Overall utilization ratio across the whole system (0.0 for an empty
    /// or zero-capacity system).
    #[inline]
    pub fn overall_utilization(&self) -> f64 {
        if self.total_capacity == 0 {
            0.0
        } else {
            self.total_occupancy as f64 / self.total_capacity as f64
        }
    }
}
