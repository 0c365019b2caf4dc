use std::sync::Arc;

use ticker_core::driver::{self, Clock, DriverHandle, SharedManager, SystemClock, TimerDriver};
use ticker_core::{TickerConfig, TickerConfigExt, TimerManager};
use tokio::sync::{Mutex, RwLock};

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the individual state types.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<TickerConfig>>,
    pub manager: SharedManager,
    pub clock: Arc<dyn Clock>,
    driver: Arc<Mutex<Option<DriverHandle>>>,
}

impl CliContext {
    pub fn new(config: TickerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: TickerConfig, clock: Arc<dyn Clock>) -> Self {
        let manager = TimerManager::with_capacity(config.queue_capacity);
        Self {
            config: Arc::new(RwLock::new(config)),
            manager: driver::shared(manager),
            clock,
            driver: Arc::new(Mutex::new(None)),
        }
    }

    /// Spawn the tick loop, replacing any loop already running.
    pub async fn start_driver(&self) {
        let tick = self.config.read().await.tick_interval();
        let handle = TimerDriver::new(Arc::clone(&self.manager), Arc::clone(&self.clock), tick).spawn();

        if let Some(previous) = self.driver.lock().await.replace(handle) {
            previous.shutdown().await;
        }
    }

    pub async fn stop_driver(&self) {
        if let Some(handle) = self.driver.lock().await.take() {
            handle.shutdown().await;
        }
    }

    pub async fn driver_running(&self) -> bool {
        self.driver
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
