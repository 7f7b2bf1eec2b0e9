//! Trade message decoding
//!
//! Normalizes raw stream payloads into [`TradeEvent`]s.

mod binance;
mod types;

pub use binance::{stream_url, TradeDecoder};
pub use types::{DecodeError, TradeEvent};
