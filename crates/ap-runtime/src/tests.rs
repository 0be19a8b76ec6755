//! Unit tests drive the task bodies one iteration at a time; the
//! integration test runs the whole closed loop on real threads at
//! millisecond cadence.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use ap_bus::{MemoryBus, Message, MessageBus, codec, topic};
use ap_control::Controller;
use ap_core::{
    AdaptationAction, AdaptationThresholds, ControlCommand, GateState, LotConfig, LotId,
    SimulationParams, TelemetrySnapshot, Timestamp,
};
use ap_knowledge::NoopStore;
use ap_sim::LotEngine;

use crate::signal::StopSignal;
use crate::system::SystemBuilder;
use crate::task::{ControlTask, LotTask};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn config(id: &str, capacity: u32) -> LotConfig {
    LotConfig {
        id: LotId::from(id),
        name: format!("Lot {id}"),
        total_capacity: capacity,
        initial_occupancy: 0,
        base_price: 5.0,
        min_price: 2.0,
        max_price: 10.0,
    }
}

/// Certain arrivals, no departures, no abandonment, flat traffic.
fn deterministic_params() -> SimulationParams {
    SimulationParams {
        traffic_variation: false,
        base_arrival_rate: 1.0,
        base_departure_rate: 0.0,
        queue_abandon_probability: 0.0,
        ..SimulationParams::default()
    }
}

fn lot_task(bus: &Arc<dyn MessageBus>, id: &str, capacity: u32) -> LotTask {
    let engine = LotEngine::new(config(id, capacity), deterministic_params()).unwrap();
    LotTask::new(engine, Arc::clone(bus), Duration::from_millis(1), StopSignal::new()).unwrap()
}

fn recv_snapshot(rx: &Receiver<Message>) -> TelemetrySnapshot {
    let msg = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    codec::decode(&msg.payload).unwrap()
}

fn snapshot(id: &str, occupancy: u32, capacity: u32, queue: u32) -> TelemetrySnapshot {
    TelemetrySnapshot::from_state(
        LotId::from(id),
        occupancy,
        capacity,
        queue,
        0,
        5.0,
        GateState::Open,
        0.0,
        0.5,
        Timestamp(1_000),
    )
}

// ── Lot task tests ────────────────────────────────────────────────────────────

mod lot_task_tests {
    use super::*;
    use ap_core::CommandParams;

    #[test]
    fn iteration_publishes_telemetry() {
        let bus: Arc<dyn MessageBus> = Arc::new(MemoryBus::new());
        let sensors = bus.subscribe(topic::ALL_SENSORS).unwrap();
        let mut task = lot_task(&bus, "lot_a", 50);

        assert!(task.run_iteration(Timestamp(100)));

        let snap = recv_snapshot(&sensors);
        assert_eq!(snap.lot_id, LotId::from("lot_a"));
        assert_eq!(snap.current_occupancy, 10); // 10 certain arrivals
        assert_eq!(snap.timestamp, Timestamp(100));
    }

    #[test]
    fn buffered_command_is_applied_on_the_next_tick() {
        let bus: Arc<dyn MessageBus> = Arc::new(MemoryBus::new());
        let sensors = bus.subscribe(topic::ALL_SENSORS).unwrap();
        let mut task = lot_task(&bus, "lot_a", 50);

        let close = ControlCommand {
            lot_id: LotId::from("lot_a"),
            action: AdaptationAction::CloseGate,
            parameters: CommandParams::EMPTY,
            timestamp: Timestamp(100),
            reason: "test".into(),
        };
        bus.publish(&topic::control_topic(&LotId::from("lot_a")), codec::encode(&close).unwrap())
            .unwrap();

        task.run_iteration(Timestamp(100));
        let snap = recv_snapshot(&sensors);
        assert_eq!(snap.gate_state, GateState::Closed);
    }

    #[test]
    fn malformed_command_is_dropped() {
        let bus: Arc<dyn MessageBus> = Arc::new(MemoryBus::new());
        let sensors = bus.subscribe(topic::ALL_SENSORS).unwrap();
        let mut task = lot_task(&bus, "lot_a", 50);

        let control = topic::control_topic(&LotId::from("lot_a"));
        bus.publish(&control, b"not json".to_vec()).unwrap();
        bus.publish(&control, br#"{"lot_id":"lot_a","action":"warp_drive"}"#.to_vec()).unwrap();

        assert!(task.run_iteration(Timestamp(100)));
        let snap = recv_snapshot(&sensors);
        assert_eq!(snap.gate_state, GateState::Open);
    }
}

// ── Control task tests ────────────────────────────────────────────────────────

mod control_task_tests {
    use super::*;

    fn control_task(bus: &Arc<dyn MessageBus>, ids: &[&str]) -> ControlTask {
        let controller = Controller::new(
            ids.iter().map(|&id| config(id, 100)).collect(),
            AdaptationThresholds::default(),
        );
        ControlTask::new(
            controller,
            Box::new(NoopStore),
            Arc::clone(bus),
            Duration::from_millis(1),
            StopSignal::new(),
        )
        .unwrap()
    }

    #[test]
    fn cycle_turns_telemetry_into_commands_and_metrics() {
        let bus: Arc<dyn MessageBus> = Arc::new(MemoryBus::new());
        let mut task = control_task(&bus, &["lot_a", "lot_b"]);

        let commands_a = bus.subscribe(&topic::control_topic(&LotId::from("lot_a"))).unwrap();
        let metrics_rx = bus.subscribe(topic::SYSTEM_METRICS).unwrap();

        // lot_a critical with a queue; lot_b has room.
        for snap in [snapshot("lot_a", 99, 100, 3), snapshot("lot_b", 30, 100, 0)] {
            bus.publish(&topic::sensor_topic(&snap.lot_id), codec::encode(&snap).unwrap())
                .unwrap();
        }

        task.run_cycle_once(Timestamp(2_000));

        let metrics: ap_core::SystemMetrics = {
            let msg = metrics_rx.recv_timeout(Duration::from_secs(1)).unwrap();
            codec::decode(&msg.payload).unwrap()
        };
        assert_eq!(metrics.total_capacity, 200);

        let mut actions = Vec::new();
        while let Ok(msg) = commands_a.try_recv() {
            let command: ControlCommand = codec::decode(&msg.payload).unwrap();
            actions.push(command.action);
        }
        assert!(actions.contains(&AdaptationAction::IncreasePrice));
        assert!(actions.contains(&AdaptationAction::CloseGate));
        assert!(actions.contains(&AdaptationAction::RedirectVehicles));
    }

    #[test]
    fn malformed_telemetry_is_dropped() {
        let bus: Arc<dyn MessageBus> = Arc::new(MemoryBus::new());
        let mut task = control_task(&bus, &["lot_a"]);

        bus.publish(&topic::sensor_topic(&LotId::from("lot_a")), b"garbage".to_vec()).unwrap();
        task.run_cycle_once(Timestamp(2_000));

        assert_eq!(task.controller().knowledge().known_lots(), 0);
    }

    #[test]
    fn cycle_without_telemetry_publishes_nothing() {
        let bus: Arc<dyn MessageBus> = Arc::new(MemoryBus::new());
        let metrics_rx = bus.subscribe(topic::SYSTEM_METRICS).unwrap();
        let mut task = control_task(&bus, &["lot_a"]);

        task.run_cycle_once(Timestamp(2_000));
        assert!(metrics_rx.try_recv().is_err());
    }
}

// ── Closed-loop integration ───────────────────────────────────────────────────

mod system_tests {
    use super::*;

    #[test]
    fn closed_loop_adapts_and_stops_within_bounds() {
        let memory_bus = MemoryBus::new();
        let bus: Arc<dyn MessageBus> = Arc::new(memory_bus);
        let sensors = bus.subscribe(topic::ALL_SENSORS).unwrap();
        let metrics_rx = bus.subscribe(topic::SYSTEM_METRICS).unwrap();

        // lot_a fills within two ticks of certain arrivals; lot_b stays
        // nearly empty, so lot_a's redirect has a target.
        let params = SimulationParams {
            tick_interval_secs: 0.005,
            ..deterministic_params()
        };
        let thresholds = AdaptationThresholds {
            cycle_interval_secs: 0.01,
            ..AdaptationThresholds::default()
        };

        let system = SystemBuilder::new(
            Arc::clone(&bus),
            vec![config("lot_a", 15), config("lot_b", 500)],
        )
        .params(params)
        .thresholds(thresholds)
        .build()
        .unwrap();

        let running = system.start().unwrap();

        // The loop is closed when lot_a's telemetry reports the gate the
        // controller closed.
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut gate_closed = false;
        while Instant::now() < deadline {
            let Ok(msg) = sensors.recv_timeout(Duration::from_millis(500)) else { break };
            let snap: TelemetrySnapshot = codec::decode(&msg.payload).unwrap();
            assert!(snap.current_occupancy <= snap.total_capacity);
            if snap.lot_id == LotId::from("lot_a") && snap.gate_state == GateState::Closed {
                gate_closed = true;
                break;
            }
        }
        assert!(gate_closed, "controller never closed the full lot's gate");

        // Metrics flow on the side channel.
        assert!(metrics_rx.recv_timeout(Duration::from_secs(1)).is_ok());

        let stop_started = Instant::now();
        running.stop();
        assert!(stop_started.elapsed() < Duration::from_secs(6));
    }

    #[test]
    fn builder_rejects_invalid_lot_config() {
        let bus: Arc<dyn MessageBus> = Arc::new(MemoryBus::new());
        let result = SystemBuilder::new(bus, vec![config("lot_a", 0)]).build();
        assert!(result.is_err());
    }
}
