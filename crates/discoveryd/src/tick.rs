//! Periodic heartbeat feeding time-based behaviour into the workers.

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Emits monotonically increasing milliseconds since creation.
#[derive(Debug)]
pub struct MonotonicTick {
    origin: Instant,
    interval: Interval,
    last: Option<u64>,
}

impl MonotonicTick {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            origin: Instant::now(),
            interval,
            last: None,
        }
    }

    /// Waits for the next period and returns the elapsed time.
    ///
    /// The first tick completes immediately. Two ticks never carry the same
    /// value.
    pub async fn next(&mut self) -> u64 {
        let at = self.interval.tick().await;
        let mut now = u64::try_from(at.duration_since(self.origin).as_millis()).unwrap_or(u64::MAX);
        if let Some(last) = self.last {
            now = now.max(last.saturating_add(1));
        }
        self.last = Some(now);
        now
    }
}
