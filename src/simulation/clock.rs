//! Virtual stage clock
//!
//! The clock only moves when told to. Timers, countdowns and reaction
//! timestamps all read it, so a whole stage can be replayed without waiting on
//! the wall clock.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Explicitly advanced clock with millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageClock {
    /// Wall-clock instant the stage was mounted at
    origin: DateTime<Utc>,
    /// Milliseconds elapsed since `origin`
    elapsed_ms: u64,
}

impl StageClock {
    /// Create a clock starting at `origin`
    pub fn new(origin: DateTime<Utc>) -> Self {
        Self { origin, elapsed_ms: 0 }
    }

    /// Create a clock starting at the current wall-clock time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Current simulated instant
    pub fn now(&self) -> DateTime<Utc> {
        self.origin + Duration::milliseconds(self.elapsed_ms as i64)
    }

    /// Instant the clock started at
    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    /// Milliseconds since the clock started
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Elapsed time as a standard duration
    pub fn elapsed(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.elapsed_ms)
    }

    /// Move the clock to `elapsed_ms`; never moves backwards
    pub fn advance_to(&mut self, elapsed_ms: u64) {
        if elapsed_ms > self.elapsed_ms {
            self.elapsed_ms = elapsed_ms;
        }
    }

    /// Move the clock forward
    pub fn advance_by(&mut self, duration: std::time::Duration) {
        let step = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms = self.elapsed_ms.saturating_add(step);
        debug!("Advanced stage clock by {:?} to {} ms", duration, self.elapsed_ms);
    }
}

impl Default for StageClock {
    fn default() -> Self {
        Self::starting_now()
    }
}
