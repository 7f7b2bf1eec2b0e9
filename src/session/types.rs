//! Session state types

use crate::error::ConfigError;
use crate::history::{self, PriceSample};
use crate::ws::TransportError;
use std::fmt;
use thiserror::Error;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Not started, or reset
    #[default]
    Idle,
    /// Transport opened, waiting for the handshake
    Connecting,
    /// Receiving trades
    Streaming,
    /// Transport failed; waiting for an explicit retry
    Failed,
    /// Closed by the owner; terminal until reset
    Closed,
}

impl SessionPhase {
    /// Whether transport events are currently applied
    pub fn is_live(self) -> bool {
        matches!(self, SessionPhase::Connecting | SessionPhase::Streaming)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Connecting => "Connecting",
            SessionPhase::Streaming => "Streaming",
            SessionPhase::Failed => "Failed",
            SessionPhase::Closed => "Closed",
        };
        f.write_str(name)
    }
}

/// Immutable snapshot published to observers on every change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Subscribed symbol, uppercased
    pub symbol: Option<String>,
    pub phase: SessionPhase,
    /// Last delivered price as display text
    pub current_price: Option<String>,
    /// Retained samples in index order
    pub history: Vec<PriceSample>,
    /// Cause of the last transport failure
    pub connection_error: Option<TransportError>,
    pub is_connected: bool,
}

impl SessionState {
    /// Lowest and highest price in the history, for chart axes
    pub fn price_range(&self) -> Option<(f64, f64)> {
        history::price_range(&self.history)
    }
}

/// Errors returned by session control calls
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_empty() {
        let state = SessionState::default();
        assert_eq!(state.phase, SessionPhase::Idle);
        assert!(state.symbol.is_none());
        assert!(state.current_price.is_none());
        assert!(state.history.is_empty());
        assert!(state.connection_error.is_none());
        assert!(!state.is_connected);
    }

    #[test]
    fn test_price_range_over_history() {
        let state = SessionState {
            history: vec![
                PriceSample { index: 0, price: 2.0 },
                PriceSample { index: 1, price: 1.5 },
                PriceSample { index: 2, price: 3.0 },
            ],
            ..Default::default()
        };
        assert_eq!(state.price_range(), Some((1.5, 3.0)));
        assert!(SessionState::default().price_range().is_none());
    }

    #[test]
    fn test_live_phases() {
        assert!(SessionPhase::Connecting.is_live());
        assert!(SessionPhase::Streaming.is_live());
        assert!(!SessionPhase::Idle.is_live());
        assert!(!SessionPhase::Failed.is_live());
        assert!(!SessionPhase::Closed.is_live());
    }

    #[test]
    fn test_session_error_is_transparent() {
        let err = SessionError::from(TransportError::AlreadyActive);
        assert_eq!(err.to_string(), "Transport already active");

        let err = SessionError::from(ConfigError::EmptySymbol);
        assert_eq!(err.to_string(), "Symbol must not be empty");
    }
}
