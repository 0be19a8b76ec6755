//! Tests for the knowledge cache and the persistence backends.

use ap_core::{
    AdaptationAction, AdaptationDecision, AdaptationThresholds, GateState, LotConfig, LotId,
    SystemMetrics, TelemetrySnapshot, Timestamp,
};

use crate::KnowledgeBase;

fn lot_config(id: &str, capacity: u32) -> LotConfig {
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

fn snapshot(id: &str, occupancy: u32, capacity: u32, ts: i64) -> TelemetrySnapshot {
    TelemetrySnapshot::from_state(
        LotId::from(id),
        occupancy,
        capacity,
        0,
        0,
        5.0,
        GateState::Open,
        0.0,
        0.5,
        Timestamp(ts),
    )
}

fn kb(ids: &[&str]) -> KnowledgeBase {
    let configs = ids.iter().map(|&id| lot_config(id, 50)).collect();
    KnowledgeBase::new(configs, AdaptationThresholds::default())
}

// ── Cache tests ───────────────────────────────────────────────────────────────

mod cache_tests {
    use super::*;

    #[test]
    fn latest_returns_stored_snapshot() {
        let mut kb = kb(&["lot_a"]);
        kb.store_snapshot(snapshot("lot_a", 10, 50, 100));

        let cached = kb.latest(&LotId::from("lot_a")).unwrap();
        assert_eq!(cached.current_occupancy, 10);
        assert_eq!(cached.timestamp, Timestamp(100));
    }

    #[test]
    fn unknown_lot_has_no_snapshot() {
        let kb = kb(&["lot_a"]);
        assert!(kb.latest(&LotId::from("lot_b")).is_none());
        assert_eq!(kb.known_lots(), 0);
    }

    #[test]
    fn last_write_wins_by_arrival_order() {
        // Arrival order decides, not the embedded timestamp: a snapshot
        // with an older timestamp that arrives later still replaces.
        let mut kb = kb(&["lot_a"]);
        kb.store_snapshot(snapshot("lot_a", 10, 50, 200));
        kb.store_snapshot(snapshot("lot_a", 25, 50, 150));

        let cached = kb.latest(&LotId::from("lot_a")).unwrap();
        assert_eq!(cached.current_occupancy, 25);
        assert_eq!(cached.timestamp, Timestamp(150));
        assert_eq!(kb.known_lots(), 1);
    }

    #[test]
    fn all_latest_iterates_in_sorted_lot_order() {
        let mut kb = kb(&["lot_c", "lot_a", "lot_b"]);
        kb.store_snapshot(snapshot("lot_c", 1, 50, 1));
        kb.store_snapshot(snapshot("lot_a", 2, 50, 1));
        kb.store_snapshot(snapshot("lot_b", 3, 50, 1));

        let order: Vec<&str> = kb.all_latest().keys().map(|id| id.as_str()).collect();
        assert_eq!(order, vec!["lot_a", "lot_b", "lot_c"]);
    }

    #[test]
    fn static_inputs_are_available() {
        let kb = kb(&["lot_a"]);
        assert_eq!(kb.lot_config(&LotId::from("lot_a")).unwrap().total_capacity, 50);
        assert!(kb.lot_config(&LotId::from("lot_x")).is_none());
        assert!((kb.thresholds().high_occupancy_threshold - 0.90).abs() < 1e-9);
    }
}

// ── Store trait tests ─────────────────────────────────────────────────────────

mod store_tests {
    use super::*;
    use crate::{NoopStore, TimeSeriesStore};

    #[test]
    fn noop_store_accepts_everything() {
        let mut store = NoopStore;
        store.store_snapshot(&snapshot("lot_a", 5, 50, 10)).unwrap();
        store
            .store_decision(&AdaptationDecision {
                lot_id: LotId::from("lot_a"),
                timestamp: Timestamp(10),
                trigger_condition: "high_occupancy".into(),
                current_state: snapshot("lot_a", 46, 50, 10),
                actions: vec![AdaptationAction::IncreasePrice],
                expected_outcome: "demand reduction via price increase".into(),
                confidence: 0.85,
            })
            .unwrap();
        store
            .store_metrics(&SystemMetrics {
                timestamp: Timestamp(10),
                total_revenue: 0.0,
                total_occupancy: 5,
                total_capacity: 50,
                total_rejected: 0,
                total_queue_length: 0,
                average_price: 5.0,
                lots_at_capacity: 0,
                lots_under_utilized: 1,
            })
            .unwrap();
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use super::*;
    use crate::sqlite::SqliteStore;
    use crate::TimeSeriesStore;

    #[test]
    fn snapshots_round_trip_newest_first() {
        let mut store = SqliteStore::in_memory().unwrap();
        for ts in [100, 200, 300] {
            store
                .store_snapshot(&snapshot("lot_a", ts as u32 / 10, 50, ts))
                .unwrap();
        }
        store.store_snapshot(&snapshot("lot_b", 1, 50, 250)).unwrap();

        let recent = store.recent_snapshots(&LotId::from("lot_a"), 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, Timestamp(300));
        assert_eq!(recent[0].current_occupancy, 30);
        assert_eq!(recent[1].timestamp, Timestamp(200));
        assert_eq!(recent[0].gate_state, GateState::Open);
    }

    #[test]
    fn average_occupancy_respects_window() {
        let mut store = SqliteStore::in_memory().unwrap();
        // 10/50 = 20%, 20/50 = 40%, 30/50 = 60%.
        store.store_snapshot(&snapshot("lot_a", 10, 50, 100)).unwrap();
        store.store_snapshot(&snapshot("lot_a", 20, 50, 200)).unwrap();
        store.store_snapshot(&snapshot("lot_a", 30, 50, 300)).unwrap();

        let all = store.average_occupancy(&LotId::from("lot_a"), Timestamp(0)).unwrap();
        assert!((all - 40.0).abs() < 1e-9);

        let late = store.average_occupancy(&LotId::from("lot_a"), Timestamp(200)).unwrap();
        assert!((late - 50.0).abs() < 1e-9);
    }

    #[test]
    fn average_occupancy_is_zero_without_data() {
        let store = SqliteStore::in_memory().unwrap();
        let avg = store.average_occupancy(&LotId::from("lot_a"), Timestamp(0)).unwrap();
        assert_eq!(avg, 0.0);
    }

    #[test]
    fn decisions_persist_action_tags() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .store_decision(&AdaptationDecision {
                lot_id: LotId::from("lot_a"),
                timestamp: Timestamp(500),
                trigger_condition: "critical_occupancy".into(),
                current_state: snapshot("lot_a", 50, 50, 500),
                actions: vec![AdaptationAction::IncreasePrice, AdaptationAction::CloseGate],
                expected_outcome: "overload relieved".into(),
                confidence: 0.95,
            })
            .unwrap();

        let rows = store.recent_decisions(&LotId::from("lot_a"), Timestamp(0)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, Timestamp(500));
        assert_eq!(rows[0].trigger_condition, "critical_occupancy");
        assert_eq!(rows[0].actions, "increase_price,close_gate");
        assert!((rows[0].confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn metrics_insert_succeeds() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .store_metrics(&SystemMetrics {
                timestamp: Timestamp(700),
                total_revenue: 123.45,
                total_occupancy: 80,
                total_capacity: 150,
                total_rejected: 4,
                total_queue_length: 3,
                average_price: 5.5,
                lots_at_capacity: 1,
                lots_under_utilized: 0,
            })
            .unwrap();
    }
}
