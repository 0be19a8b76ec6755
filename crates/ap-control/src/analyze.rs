//! Analyze phase: evaluate one facility's cached state against thresholds.
//!
//! A pure function of snapshot + config + thresholds, so every rule is
//! unit-testable in isolation.  Evaluation order matters: the occupancy
//! bands are exclusive (first match wins), while the queue check, the
//! reopen check, and the price-bound guard each run independently
//! afterwards.

use ap_core::{AdaptationAction, AdaptationThresholds, GateState, LotConfig, LotId, Severity, TelemetrySnapshot};

/// What the analyze phase found for one facility.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub lot_id: LotId,
    /// Human-readable issue notes, in detection order.  These become the
    /// decision's trigger condition.
    pub issues: Vec<String>,
    pub severity: Severity,
    /// The snapshot the findings are based on; carried into the decision
    /// so the record is self-contained.
    pub current_state: TelemetrySnapshot,
    pub recommended_actions: Vec<AdaptationAction>,
    pub confidence: f64,
}

/// Evaluate a facility's latest snapshot.  Returns `None` when nothing
/// needs attention.
pub fn analyze(
    snapshot: &TelemetrySnapshot,
    config: &LotConfig,
    thresholds: &AdaptationThresholds,
) -> Option<Analysis> {
    let mut issues = Vec::new();
    let mut actions = Vec::new();
    let mut severity = Severity::Low;
    let mut confidence: f64 = 0.7;

    let ratio = snapshot.occupancy_ratio();

    // Exclusive occupancy bands, highest first.
    if ratio >= thresholds.critical_occupancy_threshold {
        issues.push("critical: lot at capacity".to_string());
        severity = Severity::Critical;
        actions.push(AdaptationAction::IncreasePrice);
        if snapshot.gate_state == GateState::Open {
            actions.push(AdaptationAction::CloseGate);
        }
        if snapshot.queue_length > 0 {
            actions.push(AdaptationAction::RedirectVehicles);
        }
        confidence = 0.95;
    } else if ratio >= thresholds.high_occupancy_threshold {
        issues.push(format!("high occupancy: {:.1}%", ratio * 100.0));
        severity = Severity::High;
        actions.push(AdaptationAction::IncreasePrice);
        confidence = 0.85;
    } else if ratio <= thresholds.low_occupancy_threshold {
        issues.push(format!("low occupancy: {:.1}%", ratio * 100.0));
        severity = Severity::Medium;
        actions.push(AdaptationAction::DecreasePrice);
        confidence = 0.8;
    }

    // Queue pressure, independent of the occupancy band.
    if snapshot.queue_length >= thresholds.gate_close_queue_threshold {
        issues.push(format!("long queue: {} vehicles", snapshot.queue_length));
        if severity < Severity::High {
            severity = Severity::High;
        }
        if snapshot.gate_state == GateState::Open {
            actions.push(AdaptationAction::CloseGate);
        }
        confidence = (confidence + 0.1).min(1.0);
    }

    // A closed gate reopens once occupancy has drained and the queue is
    // manageable.
    if snapshot.gate_state == GateState::Closed
        && ratio < thresholds.gate_reopen_occupancy
        && snapshot.queue_length < thresholds.gate_close_queue_threshold
    {
        issues.push(format!(
            "gate closed but lot has capacity (occupancy {:.0}%, queue {})",
            ratio * 100.0,
            snapshot.queue_length
        ));
        actions.push(AdaptationAction::OpenGate);
    }

    // Price-bound guard: a price action that cannot move the price is
    // dropped, with an explanatory note.
    if snapshot.current_price >= config.max_price {
        if let Some(pos) = actions.iter().position(|a| *a == AdaptationAction::IncreasePrice) {
            actions.remove(pos);
            issues.push("price at maximum, cannot increase further".to_string());
        }
    }
    if snapshot.current_price <= config.min_price {
        if let Some(pos) = actions.iter().position(|a| *a == AdaptationAction::DecreasePrice) {
            actions.remove(pos);
            issues.push("price at minimum, cannot decrease further".to_string());
        }
    }

    if issues.is_empty() {
        return None;
    }

    Some(Analysis {
        lot_id: snapshot.lot_id.clone(),
        issues,
        severity,
        current_state: snapshot.clone(),
        recommended_actions: actions,
        confidence,
    })
}
