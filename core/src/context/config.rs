//! Application configuration
//!
//! This module re-exports shared types from ticker-types and provides
//! persistence and validation for `TickerConfig`.

use std::time::Duration;

use super::error::ConfigError;

// Re-export all shared types
pub use ticker_types::{DEFAULT_QUEUE_CAPACITY, DEFAULT_TICK_INTERVAL_MS, TickerConfig};

const APP_NAME: &str = "ticker";
const CONFIG_NAME: &str = "config";

/// Upper bound on the pre-allocated queue, to catch typos in the config file
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;

// ─────────────────────────────────────────────────────────────────────────────
// TickerConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for TickerConfig persistence
pub trait TickerConfigExt: Sized {
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn validate(&self) -> Result<(), ConfigError>;
    fn tick_interval(&self) -> Duration;
}

impl TickerConfigExt for TickerConfig {
    /// Load the stored config, falling back to defaults if it is missing,
    /// unreadable or invalid.
    fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self, ConfigError> {
        let config: TickerConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        self.validate()?;
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTick);
        }
        if self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ConfigError::QueueCapacity {
                capacity: self.queue_capacity,
                max: MAX_QUEUE_CAPACITY,
            });
        }
        Ok(())
    }

    fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
