//! Topic scheme and subscription-filter matching.
//!
//! Topics are templated by facility id:
//!
//! ```text
//! parking/lot/{id}/sensors   engine → control loop   TelemetrySnapshot
//! parking/lot/{id}/control   control loop → engine   ControlCommand
//! parking/system/metrics     control loop → anyone   SystemMetrics
//! ```
//!
//! Filters use MQTT wildcard semantics: `+` matches exactly one level, a
//! trailing `#` matches any remainder.

use ap_core::LotId;

/// Wildcard filter covering every facility's telemetry.
pub const ALL_SENSORS: &str = "parking/lot/+/sensors";

/// System-wide aggregate metrics.
pub const SYSTEM_METRICS: &str = "parking/system/metrics";

/// Telemetry topic for one facility.
pub fn sensor_topic(lot: &LotId) -> String {
    format!("parking/lot/{lot}/sensors")
}

/// Control-command topic for one facility.
pub fn control_topic(lot: &LotId) -> String {
    format!("parking/lot/{lot}/control")
}

/// Does `filter` (possibly containing wildcards) match `topic`?
///
/// Matching is per level: `+` consumes one level, `#` must be last and
/// consumes the rest.  Literal levels compare byte-for-byte.
pub fn matches(filter: &str, topic: &str) -> bool {
    let mut f = filter.split('/');
    let mut t = topic.split('/');
    loop {
        match (f.next(), t.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => continue,
            (Some(fl), Some(tl)) if fl == tl => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}
