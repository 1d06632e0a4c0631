use std::fmt;

use tracing::debug;

use super::format_mm_ss;

/// Remaining seconds at or below which a running countdown shows as a warning.
pub const DEFAULT_WARNING_THRESHOLD_SECS: u32 = 60;

type ExpireCallback = Box<dyn FnMut() + Send>;

/// Outcome of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// The countdown was not running; nothing changed.
    Idle,
    Running { remaining: u32 },
    /// This tick reached zero and fired the expiry callback.
    Expired,
}

/// Fixed-budget countdown with a one-shot expiry callback.
///
/// The callback fires only when a tick takes the countdown to zero. `stop` and
/// `reset` never fire it, so an early submit does not also trigger the expiry path.
pub struct Countdown {
    initial_seconds: u32,
    remaining_seconds: u32,
    warning_threshold: u32,
    running: bool,
    on_expire: ExpireCallback,
}

impl Countdown {
    /// `on_expire` runs inside [`Countdown::tick`], while the caller still holds
    /// this countdown. Behind a shared lock it must not lock the same countdown;
    /// signal instead and restart after `tick` returns [`CountdownTick::Expired`].
    #[must_use]
    pub fn new(initial_seconds: u32, on_expire: impl FnMut() + Send + 'static) -> Self {
        Self {
            initial_seconds,
            remaining_seconds: initial_seconds,
            warning_threshold: DEFAULT_WARNING_THRESHOLD_SECS,
            running: false,
            on_expire: Box::new(on_expire),
        }
    }

    /// Countdown whose expiry is only observable through [`Countdown::is_expired`].
    #[must_use]
    pub fn silent(initial_seconds: u32) -> Self {
        Self::new(initial_seconds, || {})
    }

    #[must_use]
    pub fn with_warning_threshold(mut self, seconds: u32) -> Self {
        self.warning_threshold = seconds;
        self
    }

    #[must_use]
    pub fn initial_seconds(&self) -> u32 {
        self.initial_seconds
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.remaining_seconds > 0 && self.remaining_seconds <= self.warning_threshold
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }

    #[must_use]
    pub fn display(&self) -> String {
        format_mm_ss(i64::from(self.remaining_seconds))
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Halt without firing the callback. Returns the seconds left.
    pub fn stop(&mut self) -> u32 {
        self.running = false;
        self.remaining_seconds
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.initial_seconds;
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> CountdownTick {
        if !self.running {
            return CountdownTick::Idle;
        }
        if self.remaining_seconds <= 1 {
            self.remaining_seconds = 0;
            self.running = false;
            debug!(budget = self.initial_seconds, "countdown expired");
            (self.on_expire)();
            return CountdownTick::Expired;
        }
        self.remaining_seconds -= 1;
        CountdownTick::Running {
            remaining: self.remaining_seconds,
        }
    }
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("initial_seconds", &self.initial_seconds)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("warning_threshold", &self.warning_threshold)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counted(initial: u32) -> (Countdown, Arc<AtomicU32>) {
        let fired = Arc::new(AtomicU32::new(0));
        let hits = Arc::clone(&fired);
        let countdown = Countdown::new(initial, move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        (countdown, fired)
    }

    #[test]
    fn forty_five_second_budget_expires_once() {
        let (mut countdown, fired) = counted(45);
        countdown.start();
        for _ in 0..44 {
            assert!(matches!(countdown.tick(), CountdownTick::Running { .. }));
        }
        assert_eq!(countdown.remaining_seconds(), 1);
        assert!(countdown.is_warning());
        assert!(!countdown.is_expired());
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(countdown.is_expired());
        assert!(!countdown.is_warning());
        assert!(!countdown.is_running());
        assert_eq!(countdown.display(), "00:00");

        assert_eq!(countdown.tick(), CountdownTick::Idle);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_before_expiry_never_fires() {
        let (mut countdown, fired) = counted(3);
        countdown.start();
        countdown.tick();
        assert_eq!(countdown.stop(), 2);
        assert_eq!(countdown.stop(), 2);
        for _ in 0..5 {
            countdown.tick();
        }
        assert_eq!(countdown.remaining_seconds(), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reset_restores_budget_without_firing() {
        let (mut countdown, fired) = counted(10);
        countdown.start();
        countdown.tick();
        countdown.tick();
        countdown.reset();

        assert_eq!(countdown.remaining_seconds(), 10);
        assert!(!countdown.is_running());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn warning_window_is_sixty_seconds_by_default() {
        let mut countdown = Countdown::silent(62);
        assert!(!countdown.is_warning());
        countdown.start();
        countdown.tick();
        assert!(!countdown.is_warning());
        countdown.tick();
        assert_eq!(countdown.remaining_seconds(), 60);
        assert!(countdown.is_warning());
        assert_eq!(countdown.display(), "01:00");
    }

    #[test]
    fn custom_warning_threshold() {
        let countdown = Countdown::silent(30).with_warning_threshold(30);
        assert!(countdown.is_warning());
    }

    #[test]
    fn each_start_session_can_expire_once() {
        let (mut countdown, fired) = counted(1);
        countdown.start();
        countdown.tick();
        countdown.reset();
        countdown.start();
        countdown.tick();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shared_countdown_restarts_after_expiry_signal() {
        use std::sync::Mutex;
        use std::sync::atomic::AtomicBool;

        let expired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&expired);
        let shared = Arc::new(Mutex::new(Countdown::new(2, move || {
            flag.store(true, Ordering::SeqCst);
        })));
        shared.lock().unwrap().start();

        let mut ticks = Vec::new();
        for _ in 0..2 {
            let tick = shared.lock().unwrap().tick();
            ticks.push(tick);
            if expired.swap(false, Ordering::SeqCst) {
                let mut guard = shared.lock().unwrap();
                guard.reset();
                guard.start();
            }
        }

        assert_eq!(
            ticks,
            vec![CountdownTick::Running { remaining: 1 }, CountdownTick::Expired]
        );
        let guard = shared.lock().unwrap();
        assert!(guard.is_running());
        assert_eq!(guard.remaining_seconds(), 2);
    }
}
