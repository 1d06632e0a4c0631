//! Screen timers.
//!
//! - `Stopwatch`: free-running elapsed time, derived from wall-clock deltas.
//! - `Countdown`: fixed budget that fires a one-shot expiry callback.
//!
//! Neither schedules anything itself; a driver calls `tick()` about once a second.

mod countdown;
mod stopwatch;

pub use countdown::{Countdown, CountdownTick, DEFAULT_WARNING_THRESHOLD_SECS};
pub use stopwatch::Stopwatch;

/// Renders seconds as zero-padded `MM:SS`. Negative input renders as `00:00`.
///
/// Minutes are not wrapped into hours, so an hour reads `60:00`.
#[must_use]
pub fn format_mm_ss(seconds: i64) -> String {
    let safe = seconds.max(0);
    format!("{:02}:{:02}", safe / 60, safe % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(5), "00:05");
        assert_eq!(format_mm_ss(65), "01:05");
        assert_eq!(format_mm_ss(3599), "59:59");
        assert_eq!(format_mm_ss(3600), "60:00");
    }

    #[test]
    fn negative_seconds_clamp_to_zero() {
        assert_eq!(format_mm_ss(-3), "00:00");
    }
}
