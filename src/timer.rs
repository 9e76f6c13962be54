//! Countdown timer scheduler.
//!
//! One tick advances every running countdown by a second. The caller owns
//! the cadence; this module only defines the effect of a tick and whether
//! it warrants a flush:
//!
//! - a tick where nothing changed never flushes
//! - a tick where a countdown reached zero always flushes
//! - any other changed tick flushes once the save interval has elapsed
//!   since the last tick-triggered flush
//!
//! Progress made between flushes lives only in memory. Nothing here flushes
//! on shutdown.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::task::Task;

/// Default spacing between tick-triggered flushes
pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(5);

/// Cadence a driver should tick at
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What a single tick did to the collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Tasks the tick modified
    pub changed: Vec<String>,
    /// Tasks that reached zero on this tick and were paused
    pub zero_crossings: Vec<String>,
    /// Whether the tick flushed the collection
    pub flushed: bool,
}

impl TickReport {
    pub fn is_dirty(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn crossed_zero(&self) -> bool {
        !self.zero_crossings.is_empty()
    }
}

/// Debounce state for the tick write path
#[derive(Debug, Clone)]
pub struct TimerScheduler {
    save_interval: Duration,
    last_flush: Instant,
}

impl TimerScheduler {
    /// The debounce window starts at `now`.
    pub fn new(save_interval: Duration, now: Instant) -> Self {
        Self {
            save_interval,
            last_flush: now,
        }
    }

    pub fn save_interval(&self) -> Duration {
        self.save_interval
    }

    /// Decrement running countdowns and pause the ones that reach zero.
    ///
    /// A task switched on while already at zero crosses zero again on its
    /// next tick: it is paused without decrementing.
    pub fn advance(tasks: &mut [Task]) -> TickReport {
        let mut report = TickReport::default();
        for task in tasks.iter_mut() {
            if !task.timer_running {
                continue;
            }
            task.remaining_seconds = task.remaining_seconds.saturating_sub(1);
            report.changed.push(task.id.clone());
            if task.remaining_seconds == 0 {
                task.timer_running = false;
                report.zero_crossings.push(task.id.clone());
                tracing::debug!(task = %task.id, "countdown reached zero");
            }
        }
        report
    }

    /// Decide whether the tick described by `report` should flush at `now`.
    ///
    /// Returning `true` starts a new debounce window; the caller is expected
    /// to save.
    pub fn should_flush(&mut self, report: &TickReport, now: Instant) -> bool {
        if !report.is_dirty() {
            return false;
        }
        let due = now.saturating_duration_since(self.last_flush) >= self.save_interval;
        if report.crossed_zero() || due {
            self.last_flush = now;
            return true;
        }
        false
    }
}
