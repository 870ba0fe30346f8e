//! Countdown bookkeeping and clock formatting.

use std::time::Duration;

use tokio::time::Instant;

/// Default assessment length: ten minutes.
pub const DEFAULT_DURATION_SECS: u32 = 600;

/// Format a second count as `m:ss`.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Deadline tracker for the one-second countdown.
///
/// The countdown only has a deadline while armed. Disarming remembers how much
/// of the current second had already elapsed, so arming again schedules the
/// next tick for the remainder of that second instead of a fresh one. Time
/// spent disarmed is never counted.
#[derive(Debug, Clone)]
pub struct Countdown {
    period: Duration,
    next_tick: Option<Instant>,
    carried: Duration,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Countdown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_tick: None,
            carried: Duration::ZERO,
        }
    }

    /// Start ticking. No-op if already armed.
    pub fn arm(&mut self, now: Instant) {
        if self.next_tick.is_none() {
            self.next_tick = Some(now + self.period.saturating_sub(self.carried));
            self.carried = Duration::ZERO;
        }
    }

    /// Stop ticking, keeping the partial second for the next `arm`.
    pub fn disarm(&mut self, now: Instant) {
        if let Some(deadline) = self.next_tick.take() {
            let left = deadline.saturating_duration_since(now);
            self.carried = self.period.saturating_sub(left);
        }
    }

    /// Stop ticking and forget any partial second.
    pub fn cancel(&mut self) {
        self.next_tick = None;
        self.carried = Duration::ZERO;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    pub fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Record that the current deadline fired and schedule the next one.
    ///
    /// The next deadline is measured from the previous one, not from `now`,
    /// so a late wake-up does not stretch the countdown.
    pub fn fired(&mut self) {
        if let Some(deadline) = self.next_tick {
            self.next_tick = Some(deadline + self.period);
        }
    }
}
