//! Timer scheduling over an injectable clock.
//!
//! The engine never sleeps. It arms timers on a [`Scheduler`], which reads
//! time from a [`Clock`], and whoever drives the engine fires them when they
//! are due. With a [`VirtualClock`] tests decide exactly when time passes;
//! with a [`SystemClock`] the async driver sleeps until the next deadline.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic source of time, measured from an arbitrary origin.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time, measured from when the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced time. Clones share the same timeline.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    nanos: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Create a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Move time forward by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute time. Never moves backwards.
    pub fn set(&self, to: Duration) {
        self.nanos.fetch_max(to.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Identifies one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// The raw id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    handle: TimerHandle,
    deadline: Duration,
}

/// A queue of armed timers.
pub struct Scheduler<C: Clock> {
    clock: C,
    next_id: u64,
    timers: Vec<Timer>,
}

impl<C: Clock> Scheduler<C> {
    /// Create a scheduler reading time from `clock`.
    #[must_use]
    pub const fn new(clock: C) -> Self {
        Self {
            clock,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    /// The clock timers are measured against.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Current time on the clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Arm a timer that is due `delay` from now.
    pub fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let deadline = self.clock.now().saturating_add(delay);
        self.timers.push(Timer { handle, deadline });
        handle
    }

    /// Disarm a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Disarm every timer.
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Check if a timer is still armed.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Deadline of the earliest armed timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Time until the earliest armed timer is due (zero if overdue).
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(self.clock.now()))
    }

    /// Remove and return the earliest timer that is due now.
    ///
    /// Timers with equal deadlines come out in the order they were armed.
    pub fn pop_due(&mut self) -> Option<TimerHandle> {
        let now = self.clock.now();
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.handle))
            .map(|(i, _)| i)?;
        Some(self.timers.remove(index).handle)
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("clock", &self.clock)
            .field("pending", &self.timers.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}
