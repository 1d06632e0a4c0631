use chrono::{DateTime, Duration, Utc};

/// Wall-clock source for timers and services.
///
/// `Fixed` never moves on its own; tests step it with [`Clock::advance`] to simulate
/// the passage of time (including throttled or skipped timer callbacks).
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Shorthand for advancing a fixed clock by whole milliseconds.
    pub fn advance_millis(&mut self, millis: i64) {
        self.advance(Duration::milliseconds(millis));
    }
}

/// Whole seconds elapsed from `since` to `until`, rounded down.
///
/// A clock that went backwards yields zero rather than a negative span.
#[must_use]
pub fn whole_seconds_between(since: DateTime<Utc>, until: DateTime<Utc>) -> u64 {
    let millis = (until - since).num_milliseconds();
    u64::try_from(millis / 1000).unwrap_or(0)
}

/// Deterministic timestamp for tests and examples (2026-02-18T00:00:00Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_771_372_800;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_only_moves_when_advanced() {
        let mut clock = fixed_clock();
        assert_eq!(clock.now(), fixed_now());
        clock.advance_millis(1500);
        assert_eq!(clock.now(), fixed_now() + Duration::milliseconds(1500));
    }

    #[test]
    fn whole_seconds_floor_and_clamp() {
        let start = fixed_now();
        assert_eq!(whole_seconds_between(start, start + Duration::milliseconds(999)), 0);
        assert_eq!(whole_seconds_between(start, start + Duration::milliseconds(4100)), 4);
        assert_eq!(whole_seconds_between(start, start - Duration::seconds(3)), 0);
    }

    #[test]
    fn fixed_timestamp_matches_iso_date() {
        assert_eq!(fixed_now().to_rfc3339(), "2026-02-18T00:00:00+00:00");
    }
}
