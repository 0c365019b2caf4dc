//! Clock sources for the driver
//!
//! The timer manager never reads time itself; the driver asks a `Clock` for
//! "now" on every tick and hands the value over.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::timers::Timestamp;

/// Source of the current time in whole seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock, seconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Clamp pre-epoch system clocks to 0
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }
}

/// Clock that only moves when told to. Used for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `secs` and return the new time. Saturates at
    /// `Timestamp::MAX`, like timer re-arming does.
    pub fn advance(&self, secs: u64) -> Timestamp {
        let previous = match self.now.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
            Some(now.saturating_add(secs))
        }) {
            Ok(previous) | Err(previous) => previous,
        };
        previous.saturating_add(secs)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
