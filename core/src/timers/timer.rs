//! Timer entity
//!
//! A `Timer` is one scheduled callback. The manager owns every timer; callers
//! only ever hold the `TimerId` handed back when the timer was added.

use std::fmt;
use std::sync::Arc;

/// Whole seconds on whatever clock the caller feeds the manager.
pub type Timestamp = u64;

/// Stable handle for a scheduled timer.
///
/// Ids are allocated by the manager starting at 1 and are never reused, so
/// `TimerId::INVALID` (0) can be used as a "no timer" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimerId(u64);

impl TimerId {
    pub const INVALID: TimerId = TimerId(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that can be invoked when a timer fires.
///
/// Implemented for every `Fn()` closure. Callbacks run synchronously on the
/// thread calling `TimerManager::run_due_timers`, and a panic inside one is
/// not caught by the manager: it unwinds into the caller.
pub trait TimerCallback: Send + Sync {
    fn on_timeout(&self);
}

impl<F> TimerCallback for F
where
    F: Fn() + Send + Sync,
{
    fn on_timeout(&self) {
        self()
    }
}

/// One pending timer
pub(crate) struct Timer {
    pub(crate) id: TimerId,

    /// When the timer becomes due
    pub(crate) deadline: Timestamp,

    /// Seconds between firings (0 = one-shot)
    pub(crate) interval: u64,

    pub(crate) callback: Arc<dyn TimerCallback>,

    /// Index in the queue's backing array, maintained by `TimerQueue`
    pub(crate) queue_position: usize,
}

impl Timer {
    pub(crate) fn new(
        id: TimerId,
        deadline: Timestamp,
        interval: u64,
        callback: Arc<dyn TimerCallback>,
    ) -> Self {
        Self {
            id,
            deadline,
            interval,
            callback,
            queue_position: 0,
        }
    }

    pub(crate) fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub(crate) fn is_repeating(&self) -> bool {
        self.interval > 0
    }

    pub(crate) fn is_due(&self, now: Timestamp) -> bool {
        self.deadline <= now
    }

    /// Advance the deadline by one interval.
    ///
    /// The new deadline is computed from the previous deadline, not from the
    /// time the timer was observed due, so a late tick does not drift the
    /// schedule.
    pub(crate) fn rearm(&mut self) {
        self.deadline = self.deadline.saturating_add(self.interval);
    }

    /// Heap ordering key. Equal deadlines fall back to creation order.
    pub(crate) fn sort_key(&self) -> (Timestamp, TimerId) {
        (self.deadline, self.id)
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("deadline", &self.deadline)
            .field("interval", &self.interval)
            .field("queue_position", &self.queue_position)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a pending timer, for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerInfo {
    pub id: TimerId,
    pub deadline: Timestamp,
    pub interval: u64,
}

impl From<&Timer> for TimerInfo {
    fn from(timer: &Timer) -> Self {
        Self {
            id: timer.id,
            deadline: timer.deadline,
            interval: timer.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Arc<dyn TimerCallback> {
        Arc::new(|| {})
    }

    #[test]
    fn invalid_id_is_zero() {
        assert!(!TimerId::INVALID.is_valid());
        assert!(TimerId::new(1).is_valid());
        assert_eq!(TimerId::default(), TimerId::INVALID);
    }

    #[test]
    fn rearm_adds_interval_to_previous_deadline() {
        let mut timer = Timer::new(TimerId::new(1), 100, 5, noop());
        timer.rearm();
        assert_eq!(timer.deadline(), 105);
        timer.rearm();
        assert_eq!(timer.deadline(), 110);
    }

    #[test]
    fn rearm_saturates() {
        let mut timer = Timer::new(TimerId::new(1), u64::MAX - 1, 5, noop());
        timer.rearm();
        assert_eq!(timer.deadline(), u64::MAX);
    }

    #[test]
    fn due_at_deadline() {
        let timer = Timer::new(TimerId::new(1), 100, 0, noop());
        assert!(!timer.is_due(99));
        assert!(timer.is_due(100));
        assert!(timer.is_due(101));
        assert!(!timer.is_repeating());
    }
}
