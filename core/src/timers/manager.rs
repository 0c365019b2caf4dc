//! Timer manager
//!
//! Owns the timer queue and the id allocator, and runs the due-timer batch
//! protocol once per driver tick.
//!
//! The manager never reads a clock. Callers pass "now" into
//! `run_due_timers` and a base time into `add_timer`, which keeps the whole
//! type deterministic under a synthetic clock.
//!
//! # Callback contract
//!
//! Callbacks run synchronously, in firing order, after every structural change
//! for the pass has been made. A panicking callback is not caught: the panic
//! unwinds out of `run_due_timers` and the remaining callbacks of that batch
//! are skipped. The queue itself stays consistent and the manager can keep
//! being used.
//!
//! The manager is not internally synchronized. Share it behind a single owner
//! or an external lock (the driver uses a `tokio::sync::Mutex`).

use std::sync::Arc;

use super::queue::TimerQueue;
use super::timer::{Timer, TimerCallback, TimerId, TimerInfo, Timestamp};

pub use ticker_types::DEFAULT_QUEUE_CAPACITY;

/// Schedules callbacks by deadline and fires them when due.
pub struct TimerManager {
    queue: TimerQueue,

    /// Last id handed out (0 = none yet)
    last_id: u64,

    /// Callbacks collected during a run pass, invoked once the pass is done.
    /// Kept between calls so its allocation is reused.
    due: Vec<Arc<dyn TimerCallback>>,

    /// Repeating timers popped this pass, pushed back once collection ends
    rearmed: Vec<Timer>,
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("pending", &self.queue.len())
            .field("last_id", &self.last_id)
            .finish()
    }
}

impl TimerManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: TimerQueue::with_capacity(capacity),
            last_id: 0,
            due: Vec::new(),
            rearmed: Vec::new(),
        }
    }

    // ─── Scheduling ─────────────────────────────────────────────────────────

    /// Schedule `callback` to fire at `deadline`.
    ///
    /// With `interval > 0` the timer re-arms itself every `interval` seconds
    /// after each firing, measured from the previous deadline.
    pub fn add_timer<C>(&mut self, callback: C, deadline: Timestamp, interval: u64) -> TimerId
    where
        C: TimerCallback + 'static,
    {
        self.add_shared(Arc::new(callback), deadline, interval)
    }

    /// Schedule `callback` to fire `delay` seconds after `base_time`.
    pub fn add_timer_after<C>(
        &mut self,
        callback: C,
        base_time: Timestamp,
        delay: u64,
        interval: u64,
    ) -> TimerId
    where
        C: TimerCallback + 'static,
    {
        self.add_shared(Arc::new(callback), base_time.saturating_add(delay), interval)
    }

    /// Schedule an already shared callback. The same callback may back
    /// several timers.
    pub fn add_shared(
        &mut self,
        callback: Arc<dyn TimerCallback>,
        deadline: Timestamp,
        interval: u64,
    ) -> TimerId {
        let id = self.next_id();
        self.queue.push(Timer::new(id, deadline, interval, callback));

        tracing::debug!(id = id.get(), deadline, interval, pending = self.queue.len(), "Timer added");
        id
    }

    /// Cancel a pending timer.
    ///
    /// Unknown, already fired and `INVALID` ids are ignored. Returns whether a
    /// timer was actually removed; callers are free to discard the result.
    pub fn remove_timer(&mut self, id: TimerId) -> bool {
        // Cancellation is driven by callers, not the tick loop, so a scan is fine.
        let Some(index) = self.queue.position_of(id) else {
            return false;
        };

        let removed = self.queue.remove_at(index).is_some();
        if removed {
            tracing::debug!(id = id.get(), pending = self.queue.len(), "Timer removed");
        }
        removed
    }

    /// Fire every timer whose deadline is at or before `now`.
    ///
    /// Each pending timer is looked at most once per call: a repeating timer
    /// whose re-armed deadline is still `<= now` fires again on the next call,
    /// not this one. Returns the number of callbacks invoked.
    pub fn run_due_timers(&mut self, now: Timestamp) -> usize {
        if self.queue.is_empty() {
            return 0;
        }

        self.collect_due(now);

        let fired = self.due.len();
        if fired > 0 {
            tracing::debug!(now, fired, pending = self.queue.len(), "Running due timers");
        }

        // Drain empties the batch even if a callback unwinds, and keeps capacity.
        for callback in self.due.drain(..) {
            callback.on_timeout();
        }

        fired
    }

    /// Pop every due timer into the batch, re-arming repeaters.
    fn collect_due(&mut self, now: Timestamp) {
        while self.queue.peek().is_some_and(|timer| timer.is_due(now)) {
            let Some(mut timer) = self.queue.pop() else {
                break;
            };

            tracing::trace!(id = timer.id.get(), deadline = timer.deadline, "Timer due");
            self.due.push(Arc::clone(&timer.callback));

            if timer.is_repeating() {
                timer.rearm();
                self.rearmed.push(timer);
            }
        }

        // Held back until here so no timer is inspected twice in one pass.
        for timer in self.rearmed.drain(..) {
            self.queue.push(timer);
        }
    }

    fn next_id(&mut self) -> TimerId {
        self.last_id += 1;
        TimerId::new(self.last_id)
    }

    // ─── Inspection ─────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.queue.position_of(id).is_some()
    }

    /// Current deadline of a pending timer
    pub fn deadline_of(&self, id: TimerId) -> Option<Timestamp> {
        self.queue
            .position_of(id)
            .and_then(|index| self.queue.get(index))
            .map(Timer::deadline)
    }

    /// Deadline of the next timer to fire
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queue.peek().map(Timer::deadline)
    }

    /// Snapshot of all pending timers in firing order
    pub fn pending(&self) -> Vec<TimerInfo> {
        let mut timers: Vec<TimerInfo> = self.queue.iter().map(TimerInfo::from).collect();
        timers.sort_by_key(|t| (t.deadline, t.id));
        timers
    }

    #[cfg(test)]
    pub(crate) fn queue(&self) -> &TimerQueue {
        &self.queue
    }

    #[cfg(test)]
    pub(crate) fn due_capacity(&self) -> usize {
        self.due.capacity()
    }
}
