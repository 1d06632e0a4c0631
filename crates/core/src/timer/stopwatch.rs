use chrono::{DateTime, Utc};

use super::format_mm_ss;
use crate::time::{Clock, whole_seconds_between};

/// Free-running elapsed-time tracker.
///
/// The elapsed value is always `base + floor(now - started_at)`, read from the clock.
/// Ticks never add to it, so throttled or skipped callbacks cannot make it drift.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    clock: Clock,
    started_at: Option<DateTime<Utc>>,
    base_seconds: u64,
}

impl Stopwatch {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            started_at: None,
            base_seconds: 0,
        }
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Mutable access to the clock, used to step a fixed clock in tests.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Start counting. Does nothing while already running; accumulated time is kept.
    pub fn start(&mut self) {
        if self.started_at.is_some() {
            return;
        }
        self.started_at = Some(self.clock.now());
    }

    /// Freeze and return the total. Stopping a stopped watch returns the same value.
    pub fn stop(&mut self) -> u64 {
        let total = self.elapsed_seconds();
        self.base_seconds = total;
        self.started_at = None;
        total
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.base_seconds = 0;
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        match self.started_at {
            Some(started_at) => self
                .base_seconds
                .saturating_add(whole_seconds_between(started_at, self.clock.now())),
            None => self.base_seconds,
        }
    }

    /// Periodic re-render hook. Returns the current elapsed seconds.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.elapsed_seconds()
    }

    #[must_use]
    pub fn display(&self) -> String {
        format_mm_ss(i64::try_from(self.elapsed_seconds()).unwrap_or(i64::MAX))
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new(Clock::default_clock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_clock;

    #[test]
    fn starts_at_zero() {
        let watch = Stopwatch::new(fixed_clock());
        assert_eq!(watch.elapsed_seconds(), 0);
        assert_eq!(watch.display(), "00:00");
        assert!(!watch.is_running());
    }

    #[test]
    fn counts_whole_seconds_from_wall_clock() {
        let mut watch = Stopwatch::new(fixed_clock());
        watch.start();
        watch.clock_mut().advance_millis(2200);

        assert_eq!(watch.tick(), 2);
        assert_eq!(watch.elapsed_seconds(), 2);
        assert_eq!(watch.display(), "00:02");
    }

    #[test]
    fn stop_freezes_the_value() {
        let mut watch = Stopwatch::new(fixed_clock());
        watch.start();
        watch.clock_mut().advance_millis(4100);

        assert_eq!(watch.stop(), 4);
        watch.clock_mut().advance_millis(3000);
        assert_eq!(watch.elapsed_seconds(), 4);
        assert!(!watch.is_running());
        assert_eq!(watch.stop(), 4);
    }

    #[test]
    fn restart_keeps_accumulated_seconds() {
        let mut watch = Stopwatch::new(fixed_clock());
        watch.start();
        watch.clock_mut().advance_millis(3000);
        watch.stop();
        watch.clock_mut().advance_millis(10_000);
        watch.start();
        watch.clock_mut().advance_millis(2500);

        assert_eq!(watch.elapsed_seconds(), 5);
    }

    #[test]
    fn start_while_running_does_not_move_start_time() {
        let mut watch = Stopwatch::new(fixed_clock());
        watch.start();
        let first = watch.started_at();
        watch.clock_mut().advance_millis(1500);
        watch.start();

        assert_eq!(watch.started_at(), first);
        watch.clock_mut().advance_millis(600);
        assert_eq!(watch.elapsed_seconds(), 2);
    }

    #[test]
    fn skipped_ticks_do_not_cause_drift() {
        let mut watch = Stopwatch::new(fixed_clock());
        watch.start();
        // a backgrounded host may deliver one tick after a long gap
        watch.clock_mut().advance_millis(95_400);
        assert_eq!(watch.tick(), 95);
        assert_eq!(watch.display(), "01:35");
    }

    #[test]
    fn reset_clears_everything() {
        let mut watch = Stopwatch::new(fixed_clock());
        watch.start();
        watch.clock_mut().advance_millis(3000);
        watch.stop();
        watch.reset();

        assert_eq!(watch.elapsed_seconds(), 0);
        assert_eq!(watch.display(), "00:00");
        assert!(!watch.is_running());

        watch.start();
        watch.reset();
        assert!(!watch.is_running());
    }
}
