//! Externally-supplied configuration structs.
//!
//! The core does not parse config files — the application crate loads
//! TOML/JSON/YAML however it likes and hands these structs in.  Every
//! tunable has a serde default matching the documented operating defaults,
//! so a minimal config only names the facilities.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, LotId};

// ── Facility configuration ────────────────────────────────────────────────────

/// Immutable configuration of one facility, set once at startup.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LotConfig {
    pub id: LotId,
    pub name: String,
    pub total_capacity: u32,
    #[serde(default)]
    pub initial_occupancy: u32,
    pub base_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl LotConfig {
    /// Check the construction invariants: positive capacity, initial
    /// occupancy within capacity, and `min ≤ base ≤ max` pricing.
    pub fn validate(&self) -> CoreResult<()> {
        if self.total_capacity == 0 {
            return Err(CoreError::Config(format!("lot {}: capacity must be > 0", self.id)));
        }
        if self.initial_occupancy > self.total_capacity {
            return Err(CoreError::Config(format!(
                "lot {}: initial occupancy {} exceeds capacity {}",
                self.id, self.initial_occupancy, self.total_capacity
            )));
        }
        if !(self.min_price <= self.base_price && self.base_price <= self.max_price) {
            return Err(CoreError::Config(format!(
                "lot {}: prices must satisfy min ≤ base ≤ max (got {} ≤ {} ≤ {})",
                self.id, self.min_price, self.base_price, self.max_price
            )));
        }
        Ok(())
    }
}

// ── Adaptation thresholds ─────────────────────────────────────────────────────

/// Goal thresholds and step sizes for the control loop.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AdaptationThresholds {
    /// Occupancy ratio at which the facility is considered at capacity.
    #[serde(default = "d_critical")]
    pub critical_occupancy_threshold: f64,
    /// Occupancy ratio above which demand is dampened by raising the price.
    #[serde(default = "d_high")]
    pub high_occupancy_threshold: f64,
    /// Occupancy ratio below which the facility is under-utilized.
    #[serde(default = "d_low")]
    pub low_occupancy_threshold: f64,
    /// Queue length at which the gate is closed to control inflow.
    #[serde(default = "d_queue")]
    pub gate_close_queue_threshold: u32,
    /// Occupancy ratio below which a closed gate may reopen.
    #[serde(default = "d_reopen")]
    pub gate_reopen_occupancy: f64,
    #[serde(default = "d_inc_step")]
    pub price_increase_step: f64,
    #[serde(default = "d_dec_step")]
    pub price_decrease_step: f64,
    /// Multiplies the increase step when occupancy is ≥ 98%.
    #[serde(default = "d_crit_mult")]
    pub critical_price_multiplier: f64,
    /// Minimum seconds between two executed adaptations for one facility.
    #[serde(default = "d_cooldown")]
    pub adaptation_cooldown_secs: i64,
    /// Seconds between control cycles.
    #[serde(default = "d_cycle")]
    pub cycle_interval_secs: f64,
}

fn d_critical() -> f64 { 0.98 }
fn d_high() -> f64 { 0.90 }
fn d_low() -> f64 { 0.50 }
fn d_queue() -> u32 { 8 }
fn d_reopen() -> f64 { 0.85 }
fn d_inc_step() -> f64 { 1.0 }
fn d_dec_step() -> f64 { 0.5 }
fn d_crit_mult() -> f64 { 1.5 }
fn d_cooldown() -> i64 { 10 }
fn d_cycle() -> f64 { 3.0 }

impl Default for AdaptationThresholds {
    fn default() -> Self {
        Self {
            critical_occupancy_threshold: d_critical(),
            high_occupancy_threshold: d_high(),
            low_occupancy_threshold: d_low(),
            gate_close_queue_threshold: d_queue(),
            gate_reopen_occupancy: d_reopen(),
            price_increase_step: d_inc_step(),
            price_decrease_step: d_dec_step(),
            critical_price_multiplier: d_crit_mult(),
            adaptation_cooldown_secs: d_cooldown(),
            cycle_interval_secs: d_cycle(),
        }
    }
}

// ── Simulation parameters ─────────────────────────────────────────────────────

/// Tunables of the stochastic facility simulation, shared by all engines.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Seconds between engine ticks.  Fractional so tests can run at
    /// millisecond cadence.
    #[serde(default = "d_tick")]
    pub tick_interval_secs: f64,
    #[serde(default = "d_arrival")]
    pub base_arrival_rate: f64,
    #[serde(default = "d_departure")]
    pub base_departure_rate: f64,
    /// When false, the external traffic level is pinned to 0.5.
    #[serde(default = "d_variation")]
    pub traffic_variation: bool,
    /// Hours (UTC) with peak external traffic.
    #[serde(default = "d_peak")]
    pub peak_hours: Vec<u32>,
    /// Hours (UTC) with moderate external traffic; all remaining hours are low.
    #[serde(default = "d_moderate")]
    pub moderate_hours: Vec<u32>,
    /// Maximum vehicles waiting at the gate before rejections start.
    #[serde(default = "d_max_queue")]
    pub max_queue_length: u32,
    /// Bernoulli trials per tick for arrivals — caps per-tick burstiness.
    #[serde(default = "d_trials")]
    pub arrival_trials: u32,
    /// Per-tick probability that some queued vehicles give up.
    #[serde(default = "d_abandon_p")]
    pub queue_abandon_probability: f64,
    /// Upper bound on vehicles abandoning the queue in one tick.
    #[serde(default = "d_abandon_max")]
    pub max_queue_abandon: u32,
    /// Master seed for the per-facility RNGs.
    #[serde(default = "d_seed")]
    pub seed: u64,
}

fn d_tick() -> f64 { 2.0 }
fn d_arrival() -> f64 { 0.3 }
fn d_departure() -> f64 { 0.15 }
fn d_variation() -> bool { true }
fn d_peak() -> Vec<u32> { vec![8, 9, 12, 13, 17, 18] }
fn d_moderate() -> Vec<u32> { vec![7, 10, 11, 14, 15, 16, 19] }
fn d_max_queue() -> u32 { 15 }
fn d_trials() -> u32 { 10 }
fn d_abandon_p() -> f64 { 0.1 }
fn d_abandon_max() -> u32 { 2 }
fn d_seed() -> u64 { 42 }

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            tick_interval_secs: d_tick(),
            base_arrival_rate: d_arrival(),
            base_departure_rate: d_departure(),
            traffic_variation: d_variation(),
            peak_hours: d_peak(),
            moderate_hours: d_moderate(),
            max_queue_length: d_max_queue(),
            arrival_trials: d_trials(),
            queue_abandon_probability: d_abandon_p(),
            max_queue_abandon: d_abandon_max(),
            seed: d_seed(),
        }
    }
}
