//! Frozen clock for deterministic entity timestamps.

use chrono::{DateTime, Duration, Utc};
use ethileo_core::clock::Clock;

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// The same clock moved forward by `by`, for "later mutation" scenarios.
    #[must_use]
    pub fn advanced(self, by: Duration) -> Self {
        Self(self.0 + by)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
