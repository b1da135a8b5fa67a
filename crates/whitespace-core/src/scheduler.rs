//! Trailing-debounce scheduler for re-scans.
//!
//! Every trigger cancels the outstanding deadline (if any) and arms a new one, so a burst of
//! edits produces a single scan once the burst has been quiet for the configured delay. At most
//! one deadline is armed at any time.

use crate::host::DocumentId;
use crate::timer::{Timer, TimerHandle};
use std::time::Duration;

/// What caused a re-scan to be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// The active document's text changed.
    TextChanged,
    /// The cursor moved within the active document.
    CursorMoved,
    /// A different document became active.
    ActiveDocumentChanged,
    /// The configuration was replaced.
    ConfigurationChanged,
    /// The user toggled highlighting.
    Toggled,
}

/// The document (and revision) a pending scan was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTarget {
    /// Document to scan.
    pub document: DocumentId,
    /// Revision at the time of the last trigger.
    pub revision: u64,
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No scan is pending.
    Idle,
    /// A scan is armed on `handle`.
    Pending {
        /// The armed deadline.
        handle: TimerHandle,
        /// Target captured from the most recent trigger.
        target: ScanTarget,
    },
}

/// Debounces scan requests over a [`Timer`].
#[derive(Debug)]
pub struct Scheduler<T: Timer> {
    timer: T,
    delay: Duration,
    state: SchedulerState,
}

impl<T: Timer> Scheduler<T> {
    /// Create an idle scheduler with the given quiet window.
    pub fn new(timer: T, delay: Duration) -> Self {
        Self {
            timer,
            delay,
            state: SchedulerState::Idle,
        }
    }

    /// Request a scan of `target`, restarting the quiet window.
    pub fn trigger(&mut self, kind: TriggerKind, target: ScanTarget) -> TimerHandle {
        if let SchedulerState::Pending { handle, .. } = self.state {
            self.timer.cancel(handle);
        }

        let handle = self.timer.schedule(self.delay);
        tracing::debug!(
            "scan scheduled: {:?} doc={} rev={} in {:?}",
            kind,
            target.document.0,
            target.revision,
            self.delay
        );
        self.state = SchedulerState::Pending { handle, target };
        handle
    }

    /// Handle an expired deadline.
    ///
    /// Returns the target to scan if `handle` is the pending one; stale handles return `None`.
    pub fn fire(&mut self, handle: TimerHandle) -> Option<ScanTarget> {
        match self.state {
            SchedulerState::Pending {
                handle: pending,
                target,
            } if pending == handle => {
                self.state = SchedulerState::Idle;
                Some(target)
            }
            _ => {
                tracing::debug!("ignoring stale timer {:?}", handle);
                None
            }
        }
    }

    /// Cancel a pending scan aimed at `document`.
    pub fn invalidate(&mut self, document: DocumentId) {
        if let SchedulerState::Pending { target, .. } = self.state
            && target.document == document
        {
            tracing::debug!("pending scan for doc={} invalidated", document.0);
            self.cancel();
        }
    }

    /// Cancel any pending scan.
    pub fn cancel(&mut self) {
        if let SchedulerState::Pending { handle, .. } = self.state {
            self.timer.cancel(handle);
        }
        self.state = SchedulerState::Idle;
    }

    /// Change the quiet window used by subsequent triggers.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// The current quiet window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Returns `true` if a scan is armed.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, SchedulerState::Pending { .. })
    }

    /// The underlying timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Mutable access to the underlying timer (to advance or poll it).
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}
