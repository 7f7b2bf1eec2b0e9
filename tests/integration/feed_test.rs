//! Integration tests for trade decoding

use rust_decimal_macros::dec;
use ticker_stream::feed::{stream_url, DecodeError, TradeDecoder};

#[test]
fn test_decode_binance_trade() {
    let msg = r#"{"e":"trade","E":1704067200000,"s":"ETHUSDT","t":1,"p":"3500.25","q":"0.5","T":1704067200001}"#;
    let event = TradeDecoder::new("ethusdt").decode(msg).unwrap();
    assert_eq!(event.symbol, "ETHUSDT");
    assert_eq!(event.price, dec!(3500.25));
    assert!(event.trade_time.is_some());
}

#[test]
fn test_decode_price_only() {
    let event = TradeDecoder::new("btcusdt")
        .decode(r#"{"p":"67321.50"}"#)
        .unwrap();
    assert_eq!(event.display_price(), "67321.50");
}

#[test]
fn test_missing_price_is_decode_error() {
    let result = TradeDecoder::new("btcusdt").decode(r#"{"x":"bad"}"#);
    assert!(matches!(result, Err(DecodeError::Malformed(_))));
}

#[test]
fn test_stream_url_lowercases_symbol() {
    assert_eq!(
        stream_url("wss://stream.binance.com:9443/ws", "SOLUSDT"),
        "wss://stream.binance.com:9443/ws/solusdt@trade"
    );
}
