//! Fixed-delay deferred actions on a caller-driven clock
//!
//! Time is a `Duration` since session start supplied by the caller, so the
//! queue behaves the same under a real event loop and in tests.

use std::time::Duration;

/// Settle time before remaining cards are re-indexed after a commit
pub const RESTACK_DELAY: Duration = Duration::from_millis(300);
/// Settle time before the summary replaces the deck
pub const SUMMARY_DELAY: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    Restack,
    ShowSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    due: Duration,
    action: DeferredAction,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    queue: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `action` to run `delay` after `now`. Entries cannot be cancelled.
    pub fn schedule(&mut self, now: Duration, delay: Duration, action: DeferredAction) {
        self.queue.push(Scheduled {
            due: now + delay,
            action,
        });
    }

    /// Removes and returns every action due at `now`, earliest first.
    pub fn take_due(&mut self, now: Duration) -> Vec<DeferredAction> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|entry| entry.due <= now);
        self.queue = pending;

        due.sort_by_key(|entry| entry.due);
        due.into_iter().map(|entry| entry.action).collect()
    }

    /// Time of the earliest pending action
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.iter().map(|entry| entry.due).min()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
