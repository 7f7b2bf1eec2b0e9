//! Market snapshot listing
//!
//! One-shot REST fetch of symbols and last prices used to build the
//! initial list of tradable pairs. Not part of the streaming path.

mod rest;

pub use rest::{BinanceRestClient, MarketError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last traded price for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTicker {
    pub symbol: String,
    pub price: String,
}

/// Exchange symbol metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(rename = "baseAsset")]
    pub base_asset: String,
}

/// One row of the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub symbol: String,
    /// Base asset, or the symbol when the exchange does not know it
    pub name: String,
    pub price: String,
}

/// Trait for snapshot sources
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Last price of every symbol
    async fn fetch_prices(&self) -> Result<Vec<PriceTicker>, MarketError>;
    /// Symbol metadata
    async fn fetch_symbols(&self) -> Result<Vec<SymbolInfo>, MarketError>;
}

/// Join prices with symbol metadata, keeping pairs quoted in `quote_asset`
pub fn build_listing(
    prices: Vec<PriceTicker>,
    symbols: &[SymbolInfo],
    quote_asset: &str,
) -> Vec<Listing> {
    let names: HashMap<&str, &str> = symbols
        .iter()
        .map(|s| (s.symbol.as_str(), s.base_asset.as_str()))
        .collect();

    prices
        .into_iter()
        .filter(|p| p.symbol.ends_with(quote_asset))
        .map(|p| Listing {
            name: names
                .get(p.symbol.as_str())
                .map(|n| n.to_string())
                .unwrap_or_else(|| p.symbol.clone()),
            symbol: p.symbol,
            price: p.price,
        })
        .collect()
}

/// Fetch both snapshots and build the listing
pub async fn load_listing(
    source: &dyn SnapshotSource,
    quote_asset: &str,
) -> Result<Vec<Listing>, MarketError> {
    let symbols = source.fetch_symbols().await?;
    let prices = source.fetch_prices().await?;

    let listing = build_listing(prices, &symbols, quote_asset);
    tracing::info!(count = listing.len(), quote_asset, "Loaded market listing");
    Ok(listing)
}
