//! Execute phase: materialize control commands from a planned decision.

use std::collections::BTreeMap;

use ap_core::{
    AdaptationAction, AdaptationDecision, AdaptationThresholds, CommandParams, ControlCommand,
    LotConfig, LotId, TelemetrySnapshot, model::round2,
};
use tracing::info;

/// A facility only qualifies as a redirect target below this occupancy
/// ratio.
const REDIRECT_TARGET_MAX_RATIO: f64 = 0.85;

/// The critical price multiplier kicks in at this occupancy percentage.
const CRITICAL_STEP_PCT: f64 = 98.0;

/// Build one control command per planned action.
///
/// Pure: price arithmetic reads the snapshot embedded in the decision, and
/// the redirect scan walks `cache` in its (sorted) iteration order, taking
/// the first other facility with room.  Stamping the cooldown and
/// publishing are the caller's job.
pub fn execute(
    decision: &AdaptationDecision,
    config: &LotConfig,
    thresholds: &AdaptationThresholds,
    cache: &BTreeMap<LotId, TelemetrySnapshot>,
) -> Vec<ControlCommand> {
    let state = &decision.current_state;

    decision
        .actions
        .iter()
        .map(|&action| {
            let parameters = match action {
                AdaptationAction::IncreasePrice => {
                    let mut step = thresholds.price_increase_step;
                    if state.occupancy_percentage >= CRITICAL_STEP_PCT {
                        step *= thresholds.critical_price_multiplier;
                    }
                    let new_price = round2((state.current_price + step).min(config.max_price));
                    CommandParams { new_price: Some(new_price), target_lot: None }
                }
                AdaptationAction::DecreasePrice => {
                    let new_price = round2(
                        (state.current_price - thresholds.price_decrease_step)
                            .max(config.min_price),
                    );
                    CommandParams { new_price: Some(new_price), target_lot: None }
                }
                AdaptationAction::RedirectVehicles => CommandParams {
                    new_price: None,
                    target_lot: redirect_target(&decision.lot_id, cache),
                },
                AdaptationAction::CloseGate
                | AdaptationAction::OpenGate
                | AdaptationAction::NoAction => CommandParams::EMPTY,
            };

            info!(lot = %decision.lot_id, action = action.as_str(), "command issued");

            ControlCommand {
                lot_id: decision.lot_id.clone(),
                action,
                parameters,
                timestamp: decision.timestamp,
                reason: decision.trigger_condition.clone(),
            }
        })
        .collect()
}

/// First other cached facility with spare capacity, in cache order.
fn redirect_target(
    from: &LotId,
    cache: &BTreeMap<LotId, TelemetrySnapshot>,
) -> Option<LotId> {
    cache
        .iter()
        .find(|(id, snapshot)| {
            *id != from && snapshot.occupancy_ratio() < REDIRECT_TARGET_MAX_RATIO
        })
        .map(|(id, _)| id.clone())
}
