mod config;
mod error;

pub use config::{
    DEFAULT_QUEUE_CAPACITY, DEFAULT_TICK_INTERVAL_MS, MAX_QUEUE_CAPACITY, TickerConfig,
    TickerConfigExt,
};
pub use error::ConfigError;
