pub mod context;
pub mod driver;
pub mod timers;

// Re-exports for convenience
pub use context::{ConfigError, TickerConfig, TickerConfigExt};
pub use driver::{Clock, DriverHandle, ManualClock, SharedManager, SystemClock, TimerDriver};
pub use timers::{TimerCallback, TimerId, TimerInfo, TimerManager, Timestamp};
