//! Async drivers that tick shared screen timers on a fixed period.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use exam_core::{Countdown, CountdownTick, Stopwatch};

/// Owns a running tick driver. Dropping or cancelling it aborts the task, after
/// which the callback is never invoked again.
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn cancel(self) {
        drop(self);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Shortest period a driver ticks at; zero periods are raised to this.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

fn interval(period: Duration) -> time::Interval {
    let period = period.max(MIN_PERIOD);
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Report the stopwatch's elapsed seconds every `period` until it stops.
///
/// A `period` below [`MIN_PERIOD`] (including zero) ticks at [`MIN_PERIOD`].
/// Must be called inside a tokio runtime.
pub fn spawn_stopwatch_ticker<F>(
    stopwatch: Arc<Mutex<Stopwatch>>,
    period: Duration,
    mut on_tick: F,
) -> TickerHandle
where
    F: FnMut(u64) + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            let elapsed = {
                let Ok(guard) = stopwatch.lock() else {
                    warn!("stopwatch lock poisoned, ticker exiting");
                    break;
                };
                if !guard.is_running() {
                    break;
                }
                guard.tick()
            };
            on_tick(elapsed);
        }
        debug!("stopwatch ticker finished");
    });
    TickerHandle { task }
}

/// Tick the countdown every `period` until it stops or expires.
///
/// The countdown's expiry callback runs while its lock is held, so it must not
/// lock `countdown` again. `on_tick` runs after the lock is released and also
/// sees the final `Expired` tick; restart the countdown from there.
///
/// A `period` below [`MIN_PERIOD`] (including zero) ticks at [`MIN_PERIOD`].
/// Must be called inside a tokio runtime.
pub fn spawn_countdown_ticker<F>(
    countdown: Arc<Mutex<Countdown>>,
    period: Duration,
    mut on_tick: F,
) -> TickerHandle
where
    F: FnMut(CountdownTick) + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            let tick = {
                let Ok(mut guard) = countdown.lock() else {
                    warn!("countdown lock poisoned, ticker exiting");
                    break;
                };
                guard.tick()
            };
            match tick {
                CountdownTick::Idle => break,
                CountdownTick::Running { .. } => on_tick(tick),
                CountdownTick::Expired => {
                    on_tick(tick);
                    break;
                }
            }
        }
        debug!("countdown ticker finished");
    });
    TickerHandle { task }
}
