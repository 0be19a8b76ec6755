//! Unit tests for ap-bus.

use ap_core::{GateState, LotId, TelemetrySnapshot, Timestamp};

use crate::bus::{MemoryBus, MessageBus};
use crate::{codec, topic};

fn snapshot(lot: &str) -> TelemetrySnapshot {
    TelemetrySnapshot::from_state(
        LotId::from(lot),
        40,
        100,
        1,
        2,
        5.0,
        GateState::Open,
        200.0,
        0.5,
        Timestamp(1_000),
    )
}

// ── Topic matching ────────────────────────────────────────────────────────────

mod topic_tests {
    use super::*;

    #[test]
    fn exact_topics_match_themselves() {
        let t = topic::sensor_topic(&LotId::from("lot_a"));
        assert_eq!(t, "parking/lot/lot_a/sensors");
        assert!(topic::matches(&t, &t));
    }

    #[test]
    fn plus_matches_exactly_one_level() {
        assert!(topic::matches(topic::ALL_SENSORS, "parking/lot/lot_a/sensors"));
        assert!(topic::matches(topic::ALL_SENSORS, "parking/lot/42/sensors"));
        // `+` must not span levels or match a missing level.
        assert!(!topic::matches(topic::ALL_SENSORS, "parking/lot/a/b/sensors"));
        assert!(!topic::matches(topic::ALL_SENSORS, "parking/lot/sensors"));
        // Different suffix.
        assert!(!topic::matches(topic::ALL_SENSORS, "parking/lot/lot_a/control"));
    }

    #[test]
    fn hash_matches_any_remainder() {
        assert!(topic::matches("parking/#", "parking/lot/lot_a/sensors"));
        assert!(topic::matches("parking/#", "parking/system/metrics"));
        assert!(!topic::matches("parking/#", "other/system/metrics"));
    }

    #[test]
    fn control_topic_is_per_lot() {
        assert_eq!(topic::control_topic(&LotId::from("x")), "parking/lot/x/control");
    }
}

// ── Codec ─────────────────────────────────────────────────────────────────────

mod codec_tests {
    use super::*;

    #[test]
    fn telemetry_round_trips() {
        let snap = snapshot("lot_a");
        let bytes = codec::encode(&snap).unwrap();
        let back: TelemetrySnapshot = codec::decode(&bytes).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn decode_tolerates_extra_fields() {
        let mut value = serde_json::to_value(snapshot("lot_a")).unwrap();
        value["firmware_version"] = serde_json::json!("2.1");
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(codec::decode::<TelemetrySnapshot>(&bytes).is_ok());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(codec::decode::<TelemetrySnapshot>(b"not json at all").is_err());
        assert!(codec::decode::<TelemetrySnapshot>(br#"{"lot_id": "a"}"#).is_err());
    }
}

// ── MemoryBus ─────────────────────────────────────────────────────────────────

mod bus_tests {
    use super::*;

    #[test]
    fn wildcard_subscriber_sees_all_lots() {
        let bus = MemoryBus::new();
        let rx = bus.subscribe(topic::ALL_SENSORS).unwrap();

        bus.publish("parking/lot/a/sensors", b"1".to_vec()).unwrap();
        bus.publish("parking/lot/b/sensors", b"2".to_vec()).unwrap();
        bus.publish("parking/system/metrics", b"3".to_vec()).unwrap();

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].topic, "parking/lot/a/sensors");
        assert_eq!(got[1].payload, b"2");
    }

    #[test]
    fn fan_out_to_multiple_subscribers() {
        let bus = MemoryBus::new();
        let rx1 = bus.subscribe("parking/lot/a/control").unwrap();
        let rx2 = bus.subscribe("parking/lot/+/control").unwrap();

        bus.publish("parking/lot/a/control", b"go".to_vec()).unwrap();

        assert_eq!(rx1.try_iter().count(), 1);
        assert_eq!(rx2.try_iter().count(), 1);
    }

    #[test]
    fn dropped_subscriber_is_pruned_and_publish_still_succeeds() {
        let bus = MemoryBus::new();
        let rx = bus.subscribe(topic::ALL_SENSORS).unwrap();
        drop(rx);
        // Lossy by contract: no error, message simply goes nowhere.
        assert!(bus.publish("parking/lot/a/sensors", b"x".to_vec()).is_ok());
    }

    #[test]
    fn clone_shares_the_same_routing_table() {
        let bus = MemoryBus::new();
        let handle = bus.clone();
        let rx = bus.subscribe("t").unwrap();
        handle.publish("t", b"via clone".to_vec()).unwrap();
        assert_eq!(rx.try_iter().count(), 1);
    }
}
