use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A millisecond range `[start_ms, end_ms]` used to scope provider reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeWindow {
    /// Create a window, rejecting `start_ms > end_ms`.
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, TypeError> {
        if start_ms > end_ms {
            return Err(TypeError::InvalidWindow {
                start: start_ms,
                end: end_ms,
            });
        }
        Ok(Self { start_ms, end_ms })
    }

    /// The window of length `span` ending at `end_ms`.
    pub fn trailing(end_ms: i64, span: Duration) -> Self {
        let span_ms = i64::try_from(span.as_millis()).unwrap_or(i64::MAX);
        Self {
            start_ms: end_ms.saturating_sub(span_ms),
            end_ms,
        }
    }

    /// Returns `true` if the instant falls inside the window (inclusive).
    pub fn contains(&self, instant_ms: i64) -> bool {
        self.start_ms <= instant_ms && instant_ms <= self.end_ms
    }

    /// Returns `true` if a session `[start_ms, end_ms]` intersects the window.
    pub fn intersects(&self, start_ms: i64, end_ms: i64) -> bool {
        start_ms <= self.end_ms && end_ms >= self.start_ms
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}ms, {}ms]", self.start_ms, self.end_ms)
    }
}

/// Source of the current instant, in milliseconds since UNIX epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock pinned to one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}
