//! The `LotEngine` — one facility's evolving state and its tick function.

use ap_core::{
    AdaptationAction, ControlCommand, GateState, LotConfig, LotId, LotRng, SimulationParams,
    TelemetrySnapshot, Timestamp,
};
use tracing::{debug, info, warn};

use crate::SimResult;
use crate::traffic::traffic_level;

/// Simulates one parking facility.
///
/// The engine exclusively owns its mutable state; commands arrive as a
/// batch per tick and are applied inside [`tick`][Self::tick], so command
/// application and tick arithmetic never interleave.
pub struct LotEngine {
    config: LotConfig,
    params: SimulationParams,
    rng: LotRng,

    occupancy: u32,
    price: f64,
    gate: GateState,
    queue: u32,
    rejected: u64,
    revenue: f64,
    traffic: f64,
    redirect_target: Option<LotId>,
}

impl LotEngine {
    /// Build an engine from a validated facility config.
    pub fn new(config: LotConfig, params: SimulationParams) -> SimResult<Self> {
        config.validate()?;
        let rng = LotRng::new(params.seed, &config.id);
        info!(
            lot = %config.id,
            capacity = config.total_capacity,
            initial = config.initial_occupancy,
            "facility engine initialized"
        );
        Ok(Self {
            occupancy: config.initial_occupancy,
            price: config.base_price,
            gate: GateState::Open,
            queue: 0,
            rejected: 0,
            revenue: 0.0,
            traffic: 0.5,
            redirect_target: None,
            config,
            params,
            rng,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn lot_id(&self) -> &LotId {
        &self.config.id
    }

    #[inline]
    pub fn gate_state(&self) -> GateState {
        self.gate
    }

    #[inline]
    pub fn current_price(&self) -> f64 {
        self.price
    }

    #[inline]
    pub fn redirect_target(&self) -> Option<&LotId> {
        self.redirect_target.as_ref()
    }

    /// A snapshot of the current state without advancing the simulation.
    pub fn state_snapshot(&self, now: Timestamp) -> TelemetrySnapshot {
        TelemetrySnapshot::from_state(
            self.config.id.clone(),
            self.occupancy,
            self.config.total_capacity,
            self.queue,
            self.rejected,
            self.price,
            self.gate,
            self.revenue,
            self.traffic,
            now,
        )
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance the facility by one tick and emit its telemetry.
    ///
    /// `commands` is everything received since the previous tick, in
    /// arrival order; each is consumed exactly once.
    pub fn tick(&mut self, now: Timestamp, commands: Vec<ControlCommand>) -> TelemetrySnapshot {
        self.traffic = traffic_level(now.hour_of_day(), &self.params, &mut self.rng);

        // Both probabilities are shaped by the pre-tick state; the counts
        // are then applied departures-first, so arrivals and the queue may
        // reuse capacity freed within this same tick.
        let arrival_p = self.arrival_probability();
        let arrivals = (0..self.params.arrival_trials)
            .filter(|_| self.rng.gen_bool(arrival_p))
            .count() as u32;

        let departure_p = self.departure_probability();
        let departures = (0..self.occupancy)
            .filter(|_| self.rng.gen_bool(departure_p))
            .count() as u32;

        self.occupancy = self.occupancy.saturating_sub(departures);

        for _ in 0..arrivals {
            self.admit_one();
        }

        // Queued vehicles enter while the gate is open and space remains.
        while self.queue > 0
            && self.occupancy < self.config.total_capacity
            && self.gate == GateState::Open
        {
            self.queue -= 1;
            self.occupancy += 1;
            self.revenue += self.price;
        }

        // Impatience: occasionally a few queued vehicles give up.
        if self.queue > 0 && self.rng.gen_bool(self.params.queue_abandon_probability) {
            let bound = self.queue.min(self.params.max_queue_abandon);
            let gave_up = self.rng.gen_range(0..=bound);
            self.queue -= gave_up;
            self.rejected += gave_up as u64;
        }

        for command in commands {
            self.apply_command(command);
        }

        let snapshot = self.state_snapshot(now);
        debug!(
            lot = %self.config.id,
            occupancy = format_args!("{}/{}", self.occupancy, self.config.total_capacity),
            queue = self.queue,
            price = self.price,
            revenue = snapshot.revenue,
            "tick"
        );
        snapshot
    }

    /// One arriving vehicle: enter, queue, or reject.
    fn admit_one(&mut self) {
        if self.gate == GateState::Closed {
            if self.queue < self.params.max_queue_length {
                self.queue += 1;
            } else {
                self.rejected += 1;
            }
        } else if self.occupancy < self.config.total_capacity {
            self.occupancy += 1;
            self.revenue += self.price;
        } else if self.queue < self.params.max_queue_length {
            self.queue += 1;
        } else {
            self.rejected += 1;
        }
    }

    // ── Demand shaping ────────────────────────────────────────────────────

    /// Per-trial arrival probability: base rate × traffic × price
    /// sensitivity × remaining-capacity damping.
    fn arrival_probability(&self) -> f64 {
        let traffic_multiplier = 0.5 + self.traffic;

        // Higher prices reduce demand, floored at 0.3.
        let price_ratio = self.price / self.config.base_price;
        let price_multiplier = (1.5 - 0.5 * price_ratio).max(0.3);

        // Near-full facilities naturally see fewer arrivals.
        let occupancy_ratio = self.occupancy as f64 / self.config.total_capacity as f64;
        let capacity_multiplier =
            if occupancy_ratio < 0.9 { 1.0 } else { (1.0 - occupancy_ratio) * 5.0 };

        self.params.base_arrival_rate * traffic_multiplier * price_multiplier * capacity_multiplier
    }

    /// Per-space departure probability, capped at 0.5.  Higher prices
    /// encourage shorter stays.
    fn departure_probability(&self) -> f64 {
        if self.occupancy == 0 {
            return 0.0;
        }
        let price_ratio = self.price / self.config.base_price;
        let price_multiplier = 1.0 + 0.2 * (price_ratio - 1.0);
        (self.params.base_departure_rate * price_multiplier).min(0.5)
    }

    // ── Command application ───────────────────────────────────────────────

    fn apply_command(&mut self, command: ControlCommand) {
        if command.lot_id != self.config.id {
            warn!(
                lot = %self.config.id,
                addressed = %command.lot_id,
                "dropping command addressed to another facility"
            );
            return;
        }
        info!(
            lot = %self.config.id,
            action = ?command.action,
            reason = %command.reason,
            "applying control command"
        );

        match command.action {
            AdaptationAction::IncreasePrice => {
                let requested = command.parameters.new_price.unwrap_or(self.price * 1.1);
                self.price = requested.clamp(self.config.min_price, self.config.max_price);
                info!(lot = %self.config.id, price = self.price, "price increased");
            }
            AdaptationAction::DecreasePrice => {
                let requested = command.parameters.new_price.unwrap_or(self.price * 0.9);
                self.price = requested.clamp(self.config.min_price, self.config.max_price);
                info!(lot = %self.config.id, price = self.price, "price decreased");
            }
            AdaptationAction::CloseGate => {
                self.gate = GateState::Closed;
                info!(lot = %self.config.id, "gate closed");
            }
            AdaptationAction::OpenGate => {
                self.gate = GateState::Open;
                info!(lot = %self.config.id, "gate opened");
            }
            AdaptationAction::RedirectVehicles => {
                self.redirect_target = command.parameters.target_lot;
                info!(lot = %self.config.id, target = ?self.redirect_target, "redirecting overflow");
            }
            AdaptationAction::NoAction => {}
        }
    }
}
