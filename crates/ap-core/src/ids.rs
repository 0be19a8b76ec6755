//! Facility identifier.
//!
//! The wire format (`parking/lot/{id}/…` topics, `lot_id` JSON fields)
//! carries string ids, so `LotId` wraps a `String` rather than a dense
//! integer index.  It is `Ord + Hash` so it can key the sorted snapshot and
//! cooldown maps without ceremony.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one managed parking facility.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(pub String);

impl LotId {
    pub fn new(id: impl Into<String>) -> Self {
        LotId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LotId {
    fn from(s: &str) -> Self {
        LotId(s.to_owned())
    }
}

impl From<String> for LotId {
    fn from(s: String) -> Self {
        LotId(s)
    }
}
