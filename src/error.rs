//! Configuration and misuse errors shared across the streaming core

use thiserror::Error;

/// Rejected configuration or a call made in the wrong session state.
///
/// These are raised synchronously at the call site; the previously
/// valid state is always left in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Throttle interval must be a positive number of milliseconds
    #[error("Update interval must be positive, got {0}ms")]
    NonPositiveInterval(i64),
    /// Rolling window must hold at least one sample
    #[error("Rolling window size must be positive")]
    ZeroWindow,
    /// Symbol was empty or whitespace
    #[error("Symbol must not be empty")]
    EmptySymbol,
    /// `start` called on a session that is not idle
    #[error("Session already active for {symbol} ({phase})")]
    AlreadyActive { symbol: String, phase: String },
    /// `retry` called on a session that has not failed
    #[error("Cannot retry a session in {0} state")]
    NotRetryable(String),
}
