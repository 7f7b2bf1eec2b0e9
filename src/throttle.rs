//! Delivery cadence throttle
//!
//! Bounds how often trades reach observers, independently of how fast the
//! exchange sends them. The boundary is inclusive: an event exactly
//! `min_interval` after the last delivery is accepted.

use crate::error::ConfigError;
use std::time::Duration;
use tokio::time::Instant;

/// Wall-clock throttle for one session
#[derive(Debug, Clone)]
pub struct Throttle {
    /// `None` until the first delivery
    last_delivered_at: Option<Instant>,
    min_interval_ms: u64,
}

impl Throttle {
    /// Create a throttle; the interval must be positive
    pub fn new(min_interval_ms: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            last_delivered_at: None,
            min_interval_ms: validate_interval(min_interval_ms)?,
        })
    }

    /// Whether an event observed at `now` should be delivered
    pub fn should_deliver(&self, now: Instant) -> bool {
        match self.last_delivered_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.min_interval(),
        }
    }

    /// Record an accepted event; call once per accepted `should_deliver`
    pub fn record_delivered(&mut self, now: Instant) {
        self.last_delivered_at = Some(now);
    }

    /// Change the interval for subsequent decisions
    ///
    /// Non-positive values are rejected and the current interval is kept.
    pub fn set_min_interval(&mut self, min_interval_ms: i64) -> Result<(), ConfigError> {
        self.min_interval_ms = validate_interval(min_interval_ms)?;
        Ok(())
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    #[cfg(test)]
    pub(crate) fn last_delivered_at(&self) -> Option<Instant> {
        self.last_delivered_at
    }

    /// Forget the last delivery so the next event is accepted
    pub fn reset(&mut self) {
        self.last_delivered_at = None;
    }
}

fn validate_interval(min_interval_ms: i64) -> Result<u64, ConfigError> {
    if min_interval_ms <= 0 {
        return Err(ConfigError::NonPositiveInterval(min_interval_ms));
    }
    Ok(min_interval_ms as u64)
}
