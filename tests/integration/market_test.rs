//! Integration tests for market listing

use ticker_stream::market::{build_listing, PriceTicker, SymbolInfo};

#[test]
fn test_listing_from_rest_payloads() {
    let prices: Vec<PriceTicker> = serde_json::from_str(
        r#"[
            {"symbol":"BTCUSDT","price":"67321.50000000"},
            {"symbol":"ETHBTC","price":"0.05210000"},
            {"symbol":"SOLUSDT","price":"150.12000000"}
        ]"#,
    )
    .unwrap();
    let symbols: Vec<SymbolInfo> = serde_json::from_str(
        r#"[
            {"symbol":"BTCUSDT","baseAsset":"BTC"},
            {"symbol":"SOLUSDT","baseAsset":"SOL"}
        ]"#,
    )
    .unwrap();

    let listing = build_listing(prices, &symbols, "USDT");
    let names: Vec<&str> = listing.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["BTC", "SOL"]);
    assert_eq!(listing[0].price, "67321.50000000");
}
