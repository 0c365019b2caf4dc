//! Shared configuration types for Ticker
//!
//! This crate contains serializable configuration types that are shared between
//! the timer core (ticker-core) and the interactive front end (ticker).

use serde::{Deserialize, Serialize};

/// Default driver cadence: one tick per second.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Default number of queue slots reserved up front.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

// ─────────────────────────────────────────────────────────────────────────────
// Ticker Config
// ─────────────────────────────────────────────────────────────────────────────

/// Main application configuration.
///
/// Persistence lives in ticker-core behind the `TickerConfigExt` trait.
/// Missing fields fall back to their defaults so older config files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerConfig {
    /// How often the driver checks for due timers, in milliseconds.
    /// Firing resolution is bounded below by this value.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Initial capacity of the timer queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Write logs to the platform config directory in addition to stdout.
    #[serde(default = "default_true")]
    pub log_to_file: bool,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            log_to_file: true,
        }
    }
}

impl TickerConfig {
    /// Copy of this config with a different tick interval.
    pub fn with_tick_interval_ms(&self, tick_interval_ms: u64) -> Self {
        Self {
            tick_interval_ms,
            ..self.clone()
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_one_second_tick() {
        let config = TickerConfig::default();
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.queue_capacity, 1024);
        assert!(config.log_to_file);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: TickerConfig = toml::from_str("tick_interval_ms = 250").unwrap();
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.log_to_file);
    }

    #[test]
    fn with_tick_interval_keeps_other_fields() {
        let config = TickerConfig {
            queue_capacity: 16,
            ..Default::default()
        };
        let faster = config.with_tick_interval_ms(100);
        assert_eq!(faster.tick_interval_ms, 100);
        assert_eq!(faster.queue_capacity, 16);
    }
}
