//! SQLite persistence backend (feature `sqlite`).
//!
//! One database file with three append-only tables: `telemetry`,
//! `decisions`, and `metrics`.  History queries cover what the analysis
//! side of the system actually asks for: recent snapshots and windowed
//! average occupancy per facility.

use std::path::Path;

use rusqlite::Connection;

use ap_core::{
    AdaptationDecision, GateState, LotId, SystemMetrics, TelemetrySnapshot, Timestamp,
};

use crate::store::TimeSeriesStore;
use crate::{StoreError, StoreResult};

/// One persisted adaptation decision, as returned by history queries.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionRow {
    pub timestamp: Timestamp,
    pub trigger_condition: String,
    /// Comma-joined snake_case action tags.
    pub actions: String,
    pub confidence: f64,
}

/// Time-series store backed by a local SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Fully in-memory store — used by tests and throwaway runs.
    pub fn in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS telemetry (
                 lot_id         TEXT    NOT NULL,
                 ts             INTEGER NOT NULL,
                 occupancy      INTEGER NOT NULL,
                 capacity       INTEGER NOT NULL,
                 occupancy_pct  REAL    NOT NULL,
                 queue_length   INTEGER NOT NULL,
                 rejected_count INTEGER NOT NULL,
                 price          REAL    NOT NULL,
                 gate_state     TEXT    NOT NULL,
                 revenue        REAL    NOT NULL,
                 traffic_level  REAL    NOT NULL
             );
             CREATE INDEX IF NOT EXISTS telemetry_lot_ts ON telemetry (lot_id, ts);
             CREATE TABLE IF NOT EXISTS decisions (
                 lot_id           TEXT    NOT NULL,
                 ts               INTEGER NOT NULL,
                 trigger_cond     TEXT    NOT NULL,
                 actions          TEXT    NOT NULL,
                 expected_outcome TEXT    NOT NULL,
                 confidence       REAL    NOT NULL,
                 occupancy_pct    REAL    NOT NULL,
                 queue_length     INTEGER NOT NULL,
                 price            REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS metrics (
                 ts                  INTEGER NOT NULL,
                 total_revenue       REAL    NOT NULL,
                 total_occupancy     INTEGER NOT NULL,
                 total_capacity      INTEGER NOT NULL,
                 total_rejected      INTEGER NOT NULL,
                 total_queue_length  INTEGER NOT NULL,
                 average_price       REAL    NOT NULL,
                 lots_at_capacity    INTEGER NOT NULL,
                 lots_under_utilized INTEGER NOT NULL
             );",
        )?;
        Ok(Self { conn })
    }

    // ── History queries ───────────────────────────────────────────────────

    /// The most recent `limit` snapshots for one facility, newest first.
    pub fn recent_snapshots(&self, lot: &LotId, limit: u32) -> StoreResult<Vec<TelemetrySnapshot>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT ts, occupancy, capacity, queue_length, rejected_count,
                    price, gate_state, revenue, traffic_level
             FROM telemetry WHERE lot_id = ?1
             ORDER BY ts DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(rusqlite::params![lot.as_str(), limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, f64>(7)?,
                row.get::<_, f64>(8)?,
            ))
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (ts, occupancy, capacity, queue, rejected, price, gate, revenue, traffic) = row?;
            let gate = parse_gate(&gate)?;
            snapshots.push(TelemetrySnapshot::from_state(
                lot.clone(),
                occupancy,
                capacity,
                queue,
                rejected,
                price,
                gate,
                revenue,
                traffic,
                Timestamp(ts),
            ));
        }
        Ok(snapshots)
    }

    /// Mean occupancy percentage for one facility since `since`
    /// (0.0 when there is no data in the window).
    pub fn average_occupancy(&self, lot: &LotId, since: Timestamp) -> StoreResult<f64> {
        let avg: Option<f64> = self.conn.query_row(
            "SELECT AVG(occupancy_pct) FROM telemetry WHERE lot_id = ?1 AND ts >= ?2",
            rusqlite::params![lot.as_str(), since.0],
            |row| row.get(0),
        )?;
        Ok(avg.unwrap_or(0.0))
    }

    /// Adaptation decisions for one facility since `since`, oldest first.
    pub fn recent_decisions(&self, lot: &LotId, since: Timestamp) -> StoreResult<Vec<DecisionRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT ts, trigger_cond, actions, confidence
             FROM decisions WHERE lot_id = ?1 AND ts >= ?2 ORDER BY ts ASC",
        )?;
        let rows = stmt.query_map(rusqlite::params![lot.as_str(), since.0], |row| {
            Ok(DecisionRow {
                timestamp: Timestamp(row.get(0)?),
                trigger_condition: row.get(1)?,
                actions: row.get(2)?,
                confidence: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}

fn parse_gate(s: &str) -> StoreResult<GateState> {
    match s {
        "open" => Ok(GateState::Open),
        "closed" => Ok(GateState::Closed),
        other => Err(StoreError::Backend(format!("unknown gate state '{other}' in database"))),
    }
}

fn gate_str(gate: GateState) -> &'static str {
    match gate {
        GateState::Open => "open",
        GateState::Closed => "closed",
    }
}

impl TimeSeriesStore for SqliteStore {
    fn store_snapshot(&mut self, snapshot: &TelemetrySnapshot) -> StoreResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO telemetry
             (lot_id, ts, occupancy, capacity, occupancy_pct, queue_length,
              rejected_count, price, gate_state, revenue, traffic_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        stmt.execute(rusqlite::params![
            snapshot.lot_id.as_str(),
            snapshot.timestamp.0,
            snapshot.current_occupancy,
            snapshot.total_capacity,
            snapshot.occupancy_percentage,
            snapshot.queue_length,
            snapshot.rejected_count,
            snapshot.current_price,
            gate_str(snapshot.gate_state),
            snapshot.revenue,
            snapshot.external_traffic_level,
        ])?;
        Ok(())
    }

    fn store_decision(&mut self, decision: &AdaptationDecision) -> StoreResult<()> {
        let actions: Vec<&str> = decision.actions.iter().map(|a| a.as_str()).collect();
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO decisions
             (lot_id, ts, trigger_cond, actions, expected_outcome, confidence,
              occupancy_pct, queue_length, price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        stmt.execute(rusqlite::params![
            decision.lot_id.as_str(),
            decision.timestamp.0,
            decision.trigger_condition,
            actions.join(","),
            decision.expected_outcome,
            decision.confidence,
            decision.current_state.occupancy_percentage,
            decision.current_state.queue_length,
            decision.current_state.current_price,
        ])?;
        Ok(())
    }

    fn store_metrics(&mut self, metrics: &SystemMetrics) -> StoreResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO metrics
             (ts, total_revenue, total_occupancy, total_capacity, total_rejected,
              total_queue_length, average_price, lots_at_capacity, lots_under_utilized)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        stmt.execute(rusqlite::params![
            metrics.timestamp.0,
            metrics.total_revenue,
            metrics.total_occupancy,
            metrics.total_capacity,
            metrics.total_rejected,
            metrics.total_queue_length,
            metrics.average_price,
            metrics.lots_at_capacity,
            metrics.lots_under_utilized,
        ])?;
        Ok(())
    }
}
