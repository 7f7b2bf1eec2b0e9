//! Binance trade stream decoding

use super::{DecodeError, TradeEvent};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Binance trade message structure
///
/// Only the price is required; everything else is optional so that
/// trimmed payloads still decode.
#[derive(Debug, Deserialize)]
struct BinanceTradeMessage {
    /// Event type
    #[serde(rename = "e")]
    event_type: Option<String>,
    /// Symbol
    #[serde(rename = "s")]
    symbol: Option<String>,
    /// Price, as a numeric string or a number
    #[serde(rename = "p")]
    price: Decimal,
    /// Trade time (milliseconds)
    #[serde(rename = "T")]
    trade_time: Option<i64>,
}

/// Build the trade stream URL for a symbol
pub fn stream_url(base_url: &str, symbol: &str) -> String {
    format!(
        "{}/{}@trade",
        base_url.trim_end_matches('/'),
        symbol.trim().to_lowercase()
    )
}

/// Decoder for one subscribed symbol
#[derive(Debug, Clone)]
pub struct TradeDecoder {
    symbol: String,
}

impl TradeDecoder {
    /// Create a decoder; `symbol` fills in payloads that omit it
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Parse a raw stream message into a trade event
    pub fn decode(&self, raw: &str) -> Result<TradeEvent, DecodeError> {
        let trade: BinanceTradeMessage = serde_json::from_str(raw)?;

        if let Some(event_type) = trade.event_type {
            if event_type != "trade" {
                return Err(DecodeError::UnexpectedEvent(event_type));
            }
        }

        let trade_time = trade
            .trade_time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        Ok(TradeEvent {
            symbol: trade.symbol.unwrap_or_else(|| self.symbol.clone()),
            price: trade.price,
            received_at: Utc::now(),
            trade_time,
        })
    }
}
