//! Exam countdown.
//!
//! The backend is the only time authority: remaining time is derived once
//! from `started_at + duration` and then decremented locally.

use chrono::{DateTime, Utc};

use crate::model::Attempt;

/// Result of one tick of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still running with this many seconds left.
    Running(u64),
    /// Time ran out on this tick. Reported exactly once.
    Expired,
    /// The countdown is frozen or stopped.
    Idle,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u64,
    stopped: bool,
    expired_reported: bool,
}

impl Countdown {
    pub fn new(remaining_secs: u64) -> Self {
        Self {
            remaining: remaining_secs,
            stopped: false,
            expired_reported: false,
        }
    }

    /// Remaining time for `attempt` as seen at `now`.
    pub fn for_attempt(attempt: &Attempt, now: DateTime<Utc>) -> Self {
        Self::new(attempt.remaining_secs(now))
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Advance by one second.
    ///
    /// An attempt that loads with no time left expires on its first tick.
    pub fn tick(&mut self) -> Tick {
        if self.stopped {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Tick::Running(self.remaining);
        }
        self.stopped = true;
        if self.expired_reported {
            Tick::Idle
        } else {
            self.expired_reported = true;
            Tick::Expired
        }
    }

    /// Stop for good and clear the remaining time.
    pub fn finish(&mut self) {
        self.remaining = 0;
        self.stopped = true;
        self.expired_reported = true;
    }
}

/// Formats seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_then_expires_once() {
        let mut countdown = Countdown::new(3);
        assert_eq!(countdown.tick(), Tick::Running(2));
        assert_eq!(countdown.tick(), Tick::Running(1));
        assert_eq!(countdown.tick(), Tick::Expired);
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.remaining(), 0);
        assert!(countdown.is_stopped());
    }

    #[test]
    fn remaining_is_monotonic() {
        let mut countdown = Countdown::new(50);
        let mut last = countdown.remaining();
        for _ in 0..60 {
            countdown.tick();
            assert!(countdown.remaining() <= last);
            last = countdown.remaining();
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn already_expired_attempt_fires_on_first_tick() {
        let mut countdown = Countdown::new(0);
        assert_eq!(countdown.tick(), Tick::Expired);
        assert_eq!(countdown.tick(), Tick::Idle);
    }

    #[test]
    fn finish_suppresses_expiry() {
        let mut countdown = Countdown::new(10);
        countdown.finish();
        assert_eq!(countdown.remaining(), 0);
        assert_eq!(countdown.tick(), Tick::Idle);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(90 * 60), "90:00");
    }
}
