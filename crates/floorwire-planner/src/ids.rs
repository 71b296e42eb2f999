//! Stable element identifiers.
//!
//! Every furniture item, zone and heating element receives an id from a
//! single process-wide counter. The counter is atomic so ids can be
//! allocated from input-handler threads while a planner runs elsewhere.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Next id to hand out. Starts at 1 so that 0 never names an element.
static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Identifier of an element registered in a [`Room`](crate::Room).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u32);

impl ElementId {
    /// Allocate a fresh id from the process-wide counter.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw id, e.g. one read back from a snapshot.
    ///
    /// Call [`ElementId::observe`] afterwards so the counter never hands
    /// the same value out again.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Bump the process-wide counter past `self`.
    pub fn observe(self) {
        NEXT_ID.fetch_max(self.0.saturating_add(1), Ordering::Relaxed);
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
