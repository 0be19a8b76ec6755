//! Plan phase: cooldown gate, conflict resolution, decision assembly.

use std::collections::BTreeMap;

use ap_core::{AdaptationAction, AdaptationDecision, LotId, Timestamp};
use tracing::{debug, info};

use crate::analyze::Analysis;

/// Turn an analysis into a concrete adaptation decision.
///
/// Returns `None` when the facility is still inside its cooldown window
/// (a hard gate, independent of severity — the anti-oscillation rule) or
/// when conflict resolution leaves no actions.
pub fn plan(
    analysis: &Analysis,
    cooldowns: &BTreeMap<LotId, Timestamp>,
    cooldown_secs: i64,
    now: Timestamp,
) -> Option<AdaptationDecision> {
    if analysis.recommended_actions.is_empty() {
        return None;
    }

    if let Some(last) = cooldowns.get(&analysis.lot_id) {
        if now.secs_since(*last) < cooldown_secs {
            debug!(lot = %analysis.lot_id, "plan skipped, cooldown active");
            return None;
        }
    }

    // Open and close are mutually exclusive; the one analysis proposed
    // first wins and the opposite is dropped.
    let mut actions: Vec<AdaptationAction> = Vec::with_capacity(analysis.recommended_actions.len());
    for &action in &analysis.recommended_actions {
        let conflicts = match action {
            AdaptationAction::OpenGate => actions.contains(&AdaptationAction::CloseGate),
            AdaptationAction::CloseGate => actions.contains(&AdaptationAction::OpenGate),
            _ => false,
        };
        if !conflicts {
            actions.push(action);
        }
    }

    if actions.is_empty() {
        return None;
    }

    let decision = AdaptationDecision {
        lot_id: analysis.lot_id.clone(),
        timestamp: now,
        trigger_condition: analysis.issues.join("; "),
        current_state: analysis.current_state.clone(),
        expected_outcome: predict_outcome(&actions),
        actions,
        confidence: analysis.confidence,
    };

    info!(
        lot = %decision.lot_id,
        trigger = %decision.trigger_condition,
        outcome = %decision.expected_outcome,
        "adaptation planned"
    );

    Some(decision)
}

/// Static per-action outcome text, concatenated in action order.
fn predict_outcome(actions: &[AdaptationAction]) -> String {
    let outcomes: Vec<&str> = actions
        .iter()
        .map(|action| match action {
            AdaptationAction::IncreasePrice => "reduced arrival rate, increased revenue per vehicle",
            AdaptationAction::DecreasePrice => "increased arrival rate, improved utilization",
            AdaptationAction::CloseGate => "controlled inflow, queue managed",
            AdaptationAction::OpenGate => "normal operations resumed",
            AdaptationAction::RedirectVehicles => "overflow diverted, fewer rejections",
            AdaptationAction::NoAction => "no change",
        })
        .collect();
    outcomes.join("; ")
}
