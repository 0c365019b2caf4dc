//! Error types for context operations

use thiserror::Error;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("tick interval must be at least 1ms")]
    InvalidTick,

    #[error("queue capacity {capacity} exceeds the limit of {max}")]
    QueueCapacity { capacity: usize, max: usize },
}
