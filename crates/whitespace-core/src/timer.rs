//! One-shot timer capability used by the re-scan scheduler.
//!
//! The engine never sleeps or spawns. It asks a [`Timer`] to arm a deadline and gets a
//! [`TimerHandle`] back; the host's event loop asks the timer which handles have expired and
//! reports each one to [`WhitespaceHighlighter::fire`](crate::WhitespaceHighlighter::fire).
//!
//! - [`ManualTimer`] runs on a virtual clock that only moves when told to (tests, replay).
//! - [`PollTimer`] uses [`Instant`] deadlines for poll-style loops (crossterm, winit, ...).

use std::time::{Duration, Instant};

/// Identifies one armed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(pub u64);

/// A source of one-shot deadlines.
pub trait Timer {
    /// Arm a one-shot deadline `delay` from now.
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Disarm a deadline. Unknown or already-expired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Armed deadlines, kept sorted by (deadline, handle).
#[derive(Debug, Clone)]
struct Deadlines<T> {
    next_id: u64,
    armed: Vec<(T, TimerHandle)>,
}

impl<T: Copy + Ord> Deadlines<T> {
    fn new() -> Self {
        Self {
            next_id: 1,
            armed: Vec::new(),
        }
    }

    fn arm(&mut self, deadline: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let idx = self.armed.partition_point(|entry| *entry <= (deadline, handle));
        self.armed.insert(idx, (deadline, handle));
        handle
    }

    fn disarm(&mut self, handle: TimerHandle) {
        self.armed.retain(|(_, h)| *h != handle);
    }

    fn take_expired(&mut self, now: T) -> Vec<TimerHandle> {
        let split = self.armed.partition_point(|(deadline, _)| *deadline <= now);
        self.armed.drain(..split).map(|(_, handle)| handle).collect()
    }

    fn next(&self) -> Option<T> {
        self.armed.first().map(|(deadline, _)| *deadline)
    }
}

/// A timer driven by a virtual clock.
///
/// ```rust
/// use std::time::Duration;
/// use whitespace_core::{ManualTimer, Timer};
///
/// let mut timer = ManualTimer::new();
/// let handle = timer.schedule(Duration::from_millis(250));
///
/// assert!(timer.advance(Duration::from_millis(249)).is_empty());
/// assert_eq!(timer.advance(Duration::from_millis(1)), vec![handle]);
/// ```
#[derive(Debug, Clone)]
pub struct ManualTimer {
    now: Duration,
    deadlines: Deadlines<Duration>,
}

impl ManualTimer {
    /// Create a timer whose clock starts at zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            deadlines: Deadlines::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward and return every handle that expired, earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerHandle> {
        self.now += by;
        self.deadlines.take_expired(self.now)
    }

    /// Number of armed deadlines.
    pub fn armed_count(&self) -> usize {
        self.deadlines.armed.len()
    }

    /// Time until the earliest armed deadline.
    pub fn next_due_in(&self) -> Option<Duration> {
        self.deadlines
            .next()
            .map(|deadline| deadline.saturating_sub(self.now))
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for ManualTimer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.deadlines.arm(self.now + delay)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.deadlines.disarm(handle);
    }
}

/// A wall-clock timer for poll-based event loops.
///
/// Use [`PollTimer::timeout`] as the event-poll timeout and call [`PollTimer::expired`] after
/// each wake-up.
#[derive(Debug, Clone)]
pub struct PollTimer {
    deadlines: Deadlines<Instant>,
}

impl PollTimer {
    /// Create an idle timer.
    pub fn new() -> Self {
        Self {
            deadlines: Deadlines::new(),
        }
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.next()
    }

    /// How long an event loop may block before the next deadline, capped at `max`.
    pub fn timeout(&self, now: Instant, max: Duration) -> Duration {
        self.next_deadline()
            .map_or(max, |deadline| deadline.saturating_duration_since(now).min(max))
    }

    /// Remove and return every handle whose deadline is at or before `now`.
    pub fn expired(&mut self, now: Instant) -> Vec<TimerHandle> {
        self.deadlines.take_expired(now)
    }
}

impl Default for PollTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for PollTimer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.deadlines.arm(Instant::now() + delay)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.deadlines.disarm(handle);
    }
}
