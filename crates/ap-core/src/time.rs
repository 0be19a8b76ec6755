//! Wall-clock time model.
//!
//! # Design
//!
//! Time is represented as integer Unix seconds.  That is all the core needs:
//! cooldown windows are second-granular, tick cadence is owned by the
//! runtime's timers, and the traffic model only wants an hour-of-day bucket.
//! Keeping the canonical unit an integer means timestamp arithmetic is exact
//! and the workspace carries no datetime dependency.
//!
//! Hour-of-day is derived in UTC.  The hour only selects a traffic bucket,
//! so the absolute offset is irrelevant as long as it is consistent.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A point in time as Unix seconds.
///
/// Stored as `i64`: comfortably past the year 292 billion in either
/// direction, and cheap to copy into every snapshot and command.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    /// The current wall-clock time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Timestamp(secs)
    }

    /// Hour of day in UTC, `0..=23`.
    #[inline]
    pub fn hour_of_day(self) -> u32 {
        (self.0.rem_euclid(86_400) / 3_600) as u32
    }

    /// Seconds elapsed from `earlier` to `self` (negative if out of order).
    #[inline]
    pub fn secs_since(self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }

    /// The timestamp `secs` seconds after `self`.
    #[inline]
    pub fn offset(self, secs: i64) -> Timestamp {
        Timestamp(self.0 + secs)
    }
}

impl std::ops::Add<i64> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn add(self, rhs: i64) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

impl std::ops::Sub for Timestamp {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: Timestamp) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
