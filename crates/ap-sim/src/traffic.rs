//! External traffic estimation.

use ap_core::{LotRng, SimulationParams};

/// Traffic level for the given UTC hour: bucket base plus ±0.1 jitter,
/// clamped to [0, 1].  With `traffic_variation` off, a constant 0.5.
pub(crate) fn traffic_level(hour: u32, params: &SimulationParams, rng: &mut LotRng) -> f64 {
    if !params.traffic_variation {
        return 0.5;
    }

    let base: f64 = if params.peak_hours.contains(&hour) {
        0.8
    } else if params.moderate_hours.contains(&hour) {
        0.5
    } else {
        0.2
    };

    (base + rng.gen_range(-0.1..=0.1)).clamp(0.0, 1.0)
}
