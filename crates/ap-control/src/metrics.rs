//! System-wide metrics aggregation over the telemetry cache.

use std::collections::BTreeMap;

use ap_core::{
    AdaptationThresholds, LotId, SystemMetrics, TelemetrySnapshot, Timestamp, model::round2,
};

/// A facility counts as "at capacity" from this occupancy percentage.
const AT_CAPACITY_PCT: f64 = 95.0;

/// Aggregate all cached snapshots into one [`SystemMetrics`] record.
///
/// Pure and idempotent: an unchanged cache yields an identical record for
/// the same `now`.  Returns `None` before any telemetry has arrived.
pub fn compute_metrics(
    cache: &BTreeMap<LotId, TelemetrySnapshot>,
    thresholds: &AdaptationThresholds,
    now: Timestamp,
) -> Option<SystemMetrics> {
    if cache.is_empty() {
        return None;
    }

    let under_pct = thresholds.low_occupancy_threshold * 100.0;

    let mut total_revenue = 0.0;
    let mut total_occupancy = 0u64;
    let mut total_capacity = 0u64;
    let mut total_rejected = 0u64;
    let mut total_queue_length = 0u64;
    let mut price_sum = 0.0;
    let mut lots_at_capacity = 0u32;
    let mut lots_under_utilized = 0u32;

    for snapshot in cache.values() {
        total_revenue += snapshot.revenue;
        total_occupancy += u64::from(snapshot.current_occupancy);
        total_capacity += u64::from(snapshot.total_capacity);
        total_rejected += snapshot.rejected_count;
        total_queue_length += u64::from(snapshot.queue_length);
        price_sum += snapshot.current_price;
        if snapshot.occupancy_percentage >= AT_CAPACITY_PCT {
            lots_at_capacity += 1;
        }
        if snapshot.occupancy_percentage < under_pct {
            lots_under_utilized += 1;
        }
    }

    Some(SystemMetrics {
        timestamp: now,
        total_revenue: round2(total_revenue),
        total_occupancy,
        total_capacity,
        total_rejected,
        total_queue_length,
        average_price: round2(price_sum / cache.len() as f64),
        lots_at_capacity,
        lots_under_utilized,
    })
}
