//! Trade event types

use chrono::{DateTime, Utc};
use std::time::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single trade decoded from the stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Trade price, scale preserved from the payload
    pub price: Decimal,
    /// Local timestamp when the message was decoded
    pub received_at: DateTime<Utc>,
    /// Exchange trade time, when the payload carries one
    pub trade_time: Option<DateTime<Utc>>,
}

impl TradeEvent {
    /// Price as shown to the user
    pub fn display_price(&self) -> String {
        self.price.to_string()
    }

    /// Delay from the exchange's trade time to local decode
    ///
    /// `None` without a trade time, or when the local clock is behind the
    /// exchange's.
    pub fn exchange_lag(&self) -> Option<Duration> {
        let trade_time = self.trade_time?;
        (self.received_at - trade_time).to_std().ok()
    }
}

/// Reasons a payload could not be decoded; never fatal to the connection
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not valid JSON or missing the price field
    #[error("Malformed trade payload: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Payload is for another stream type
    #[error("Unexpected event type: {0}")]
    UnexpectedEvent(String),
}
