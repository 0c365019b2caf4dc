//! Periodic driver
//!
//! Polls a shared `TimerManager` on a fixed cadence and fires whatever has
//! become due. Firing resolution is bounded by the tick: a one second tick
//! gives roughly one second accuracy.

mod clock;
mod tasks;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::timers::TimerManager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use tasks::DriverHandle;

/// Default driver cadence
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Manager shared between the driver task and callers.
///
/// The mutex is the only thing serializing access to the manager.
pub type SharedManager = Arc<Mutex<TimerManager>>;

pub fn shared(manager: TimerManager) -> SharedManager {
    Arc::new(Mutex::new(manager))
}

/// Calls `run_due_timers` with the clock's current time once per tick.
pub struct TimerDriver {
    manager: SharedManager,
    clock: Arc<dyn Clock>,
    tick: Duration,
}

impl TimerDriver {
    pub fn new(manager: SharedManager, clock: Arc<dyn Clock>, tick: Duration) -> Self {
        Self {
            manager,
            clock,
            // tokio::time::interval panics on a zero period
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn manager(&self) -> SharedManager {
        Arc::clone(&self.manager)
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Run a single pass. Returns the number of callbacks fired.
    pub async fn tick_once(&self) -> usize {
        let now = self.clock.now();
        let fired = self.manager.lock().await.run_due_timers(now);
        if fired > 0 {
            tracing::debug!(now, fired, "Driver tick fired timers");
        }
        fired
    }

    /// Tick forever. A panicking callback ends the loop.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(tick_ms = self.tick.as_millis() as u64, "Timer driver started");
        loop {
            interval.tick().await;
            self.tick_once().await;
        }
    }

    /// Run the tick loop on the tokio runtime.
    pub fn spawn(self) -> DriverHandle {
        DriverHandle::new(tokio::spawn(self.run()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_manager(deadline: u64, interval: u64) -> (SharedManager, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        let mut manager = TimerManager::with_capacity(8);
        manager.add_timer(
            move || {
                handle.fetch_add(1, Ordering::SeqCst);
            },
            deadline,
            interval,
        );
        (shared(manager), count)
    }

    #[tokio::test]
    async fn tick_once_passes_clock_time() {
        let (manager, count) = counting_manager(100, 0);
        let clock = Arc::new(ManualClock::new(99));
        let driver = TimerDriver::new(manager, clock.clone(), DEFAULT_TICK);

        assert_eq!(driver.tick_once().await, 0);
        clock.advance(1);
        assert_eq!(driver.tick_once().await, 1);
        assert_eq!(driver.tick_once().await, 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(driver.manager().lock().await.is_empty());
    }

    #[tokio::test]
    async fn zero_tick_is_clamped() {
        let driver = TimerDriver::new(shared(TimerManager::new()), Arc::new(ManualClock::new(0)), Duration::ZERO);
        assert_eq!(driver.tick(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn spawned_driver_fires_due_timers() {
        let (manager, count) = counting_manager(10, 5);
        let clock = Arc::new(ManualClock::new(10));
        let handle = TimerDriver::new(Arc::clone(&manager), clock.clone(), Duration::from_millis(5)).spawn();

        let fired = tokio::time::timeout(Duration::from_secs(5), async {
            while count.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(fired.is_ok(), "driver never fired the timer");

        // Clock has not moved, so the re-armed timer stays pending.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(manager.lock().await.next_deadline(), Some(15));

        handle.shutdown().await;
    }

    fn failing_callback() {
        panic!("callback failure");
    }

    #[tokio::test]
    async fn callback_panic_stops_driver_but_not_manager() {
        let mut manager = TimerManager::new();
        manager.add_timer(failing_callback, 1, 0);
        manager.add_timer(|| {}, 50, 0);
        let manager = shared(manager);

        let handle = TimerDriver::new(Arc::clone(&manager), Arc::new(ManualClock::new(1)), Duration::from_millis(5)).spawn();

        let stopped = tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(stopped.is_ok(), "driver kept running after a callback panic");

        let mut manager = manager.lock().await;
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.run_due_timers(50), 1);
        drop(manager);

        handle.shutdown().await;
    }
}
