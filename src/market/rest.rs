//! Binance REST client for snapshot data

use super::{PriceTicker, SnapshotSource, SymbolInfo};
use crate::config::RestConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Snapshot fetch errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status
    #[error("Binance API error: {status} - {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct ExchangeInfoResponse {
    symbols: Vec<SymbolInfo>,
}

/// Client for Binance's public market data endpoints
pub struct BinanceRestClient {
    base_url: String,
    client: Client,
}

impl BinanceRestClient {
    /// Create a client from configuration
    pub fn new(config: &RestConfig) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, MarketError> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "Fetching snapshot");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::Api { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SnapshotSource for BinanceRestClient {
    async fn fetch_prices(&self) -> Result<Vec<PriceTicker>, MarketError> {
        self.get_json("/api/v3/ticker/price").await
    }

    async fn fetch_symbols(&self) -> Result<Vec<SymbolInfo>, MarketError> {
        let info: ExchangeInfoResponse = self.get_json("/api/v3/exchangeInfo").await?;
        Ok(info.symbols)
    }
}
