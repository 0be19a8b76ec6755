//! Periodic task bodies for engines and the control loop.
//!
//! Each task owns its subscription receiver and drains it exactly once per
//! iteration, so inbound messages are applied inside the iteration and never
//! concurrently with it.  The `run` loops add the sleeping and the stop
//! check; `run_iteration`/`run_cycle_once` are the same bodies without
//! either, for tests.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use ap_bus::{Message, MessageBus, codec, topic};
use ap_control::Controller;
use ap_core::{ControlCommand, TelemetrySnapshot, Timestamp};
use ap_knowledge::TimeSeriesStore;
use ap_sim::LotEngine;
use tracing::{info, warn};

use crate::RuntimeResult;
use crate::signal::StopSignal;

/// Pause after a failed publish before the next attempt.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

// ── Lot task ──────────────────────────────────────────────────────────────────

/// Periodic task driving one facility's engine.
///
/// Per iteration: drain buffered control commands, tick the engine with
/// them, publish the resulting snapshot.
pub struct LotTask {
    engine: LotEngine,
    bus: Arc<dyn MessageBus>,
    inbound: Receiver<Message>,
    tick_interval: Duration,
    stop: StopSignal,
}

impl LotTask {
    pub fn new(
        engine: LotEngine,
        bus: Arc<dyn MessageBus>,
        tick_interval: Duration,
        stop: StopSignal,
    ) -> RuntimeResult<Self> {
        let inbound = bus.subscribe(&topic::control_topic(engine.lot_id()))?;
        Ok(Self { engine, bus, inbound, tick_interval, stop })
    }

    pub fn lot_id(&self) -> &ap_core::LotId {
        self.engine.lot_id()
    }

    /// One tick: apply buffered commands, advance, publish telemetry.
    ///
    /// Returns whether the publish succeeded; the caller decides the pacing.
    pub fn run_iteration(&mut self, now: Timestamp) -> bool {
        let commands = drain_commands(&self.inbound);
        let snapshot = self.engine.tick(now, commands);
        self.publish_snapshot(&snapshot)
    }

    fn publish_snapshot(&self, snapshot: &TelemetrySnapshot) -> bool {
        let sensor_topic = topic::sensor_topic(&snapshot.lot_id);
        let payload = match codec::encode(snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(lot = %snapshot.lot_id, error = %e, "telemetry encode failed");
                return false;
            }
        };
        if let Err(e) = self.bus.publish(&sensor_topic, payload) {
            // A lost snapshot is recovered by the next tick's snapshot.
            warn!(lot = %snapshot.lot_id, error = %e, "telemetry publish failed");
            return false;
        }
        true
    }

    /// Blocking loop until the stop signal is raised.
    pub fn run(mut self) {
        info!(lot = %self.engine.lot_id(), "lot task started");
        while !self.stop.is_stopped() {
            let ok = self.run_iteration(Timestamp::now());
            std::thread::sleep(if ok { self.tick_interval } else { RETRY_BACKOFF });
        }
        info!(lot = %self.engine.lot_id(), "lot task stopped");
    }
}

/// Decode everything buffered on the control subscription.  Malformed
/// messages are logged and dropped without touching engine state.
fn drain_commands(inbound: &Receiver<Message>) -> Vec<ControlCommand> {
    let mut commands = Vec::new();
    while let Ok(msg) = inbound.try_recv() {
        match codec::decode::<ControlCommand>(&msg.payload) {
            Ok(command) => commands.push(command),
            Err(e) => warn!(topic = %msg.topic, error = %e, "malformed command dropped"),
        }
    }
    commands
}

// ── Control task ──────────────────────────────────────────────────────────────

/// Periodic task driving the autonomic controller.
///
/// Per cycle: drain telemetry into the knowledge base (persisting each
/// snapshot best-effort), run analyze/plan/execute across all facilities,
/// publish metrics and commands, persist decisions.
pub struct ControlTask {
    controller: Controller,
    store: Box<dyn TimeSeriesStore>,
    bus: Arc<dyn MessageBus>,
    telemetry: Receiver<Message>,
    cycle_interval: Duration,
    stop: StopSignal,
}

impl ControlTask {
    pub fn new(
        controller: Controller,
        store: Box<dyn TimeSeriesStore>,
        bus: Arc<dyn MessageBus>,
        cycle_interval: Duration,
        stop: StopSignal,
    ) -> RuntimeResult<Self> {
        let telemetry = bus.subscribe(topic::ALL_SENSORS)?;
        Ok(Self { controller, store, bus, telemetry, cycle_interval, stop })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// One full monitor + MAPE cycle.
    pub fn run_cycle_once(&mut self, now: Timestamp) {
        self.drain_telemetry();

        let output = self.controller.run_cycle(now);

        if let Some(metrics) = &output.metrics {
            match codec::encode(metrics) {
                Ok(payload) => {
                    if let Err(e) = self.bus.publish(topic::SYSTEM_METRICS, payload) {
                        warn!(error = %e, "metrics publish failed");
                    }
                }
                Err(e) => warn!(error = %e, "metrics encode failed"),
            }
            if let Err(e) = self.store.store_metrics(metrics) {
                warn!(error = %e, "metrics write failed");
            }
        }

        for executed in &output.decisions {
            for command in &executed.commands {
                self.publish_command(command);
            }
            if let Err(e) = self.store.store_decision(&executed.decision) {
                warn!(lot = %executed.decision.lot_id, error = %e, "decision write failed");
            }
        }
    }

    /// Monitor phase: everything buffered on the wildcard subscription goes
    /// into the cache (and, best-effort, the store).
    fn drain_telemetry(&mut self) {
        while let Ok(msg) = self.telemetry.try_recv() {
            match codec::decode::<TelemetrySnapshot>(&msg.payload) {
                Ok(snapshot) => {
                    if let Err(e) = self.store.store_snapshot(&snapshot) {
                        warn!(lot = %snapshot.lot_id, error = %e, "snapshot write failed");
                    }
                    self.controller.ingest(snapshot);
                }
                Err(e) => warn!(topic = %msg.topic, error = %e, "malformed telemetry dropped"),
            }
        }
    }

    fn publish_command(&self, command: &ControlCommand) {
        let control_topic = topic::control_topic(&command.lot_id);
        match codec::encode(command) {
            Ok(payload) => {
                if let Err(e) = self.bus.publish(&control_topic, payload) {
                    warn!(lot = %command.lot_id, error = %e, "command publish failed");
                }
            }
            Err(e) => warn!(lot = %command.lot_id, error = %e, "command encode failed"),
        }
    }

    /// Blocking loop until the stop signal is raised.
    pub fn run(mut self) {
        info!("control task started");
        while !self.stop.is_stopped() {
            self.run_cycle_once(Timestamp::now());
            std::thread::sleep(self.cycle_interval);
        }
        info!("control task stopped");
    }
}
