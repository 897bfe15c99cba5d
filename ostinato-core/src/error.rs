//! Error types for ostinato-core

use thiserror::Error;

/// Errors raised while configuring a timer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// `time_scale` must be at least 1
    #[error("time scale must be at least 1")]
    ZeroTimeScale,

    /// Rule text could not be parsed
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Pattern text could not be parsed
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Result type for ostinato-core operations
pub type Result<T> = std::result::Result<T, TimerError>;
