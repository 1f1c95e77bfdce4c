//! Fixed-cadence tick accounting for hosts that drive the passive pass
//! from their own frame loop.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Accumulates elapsed time and reports how many passes are due
#[derive(Debug, Clone)]
pub struct TickTimer {
    interval: Duration,
    accumulated: Duration,
}

impl TickTimer {
    /// A zero interval is treated as one millisecond
    pub fn new(interval: Duration) -> Self {
        TickTimer {
            interval: interval.max(Duration::from_millis(1)),
            accumulated: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Add elapsed time; returns the number of whole intervals now due
    ///
    /// Saturates at `u32::MAX`; the remainder below one interval is carried.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        let total = self.accumulated.as_nanos().saturating_add(delta.as_nanos());
        let interval = self.interval.as_nanos();
        let remainder = total % interval;
        self.accumulated = Duration::new((remainder / NANOS_PER_SEC) as u64, (remainder % NANOS_PER_SEC) as u32);
        u32::try_from(total / interval).unwrap_or(u32::MAX)
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}
