//! Configuration types for ticker-stream

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Default endpoint for Binance trade streams
pub const DEFAULT_STREAM_URL: &str = "wss://stream.binance.com:9443/ws";

/// Default endpoint for Binance REST snapshots
pub const DEFAULT_REST_URL: &str = "https://api.binance.com";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub rest: RestConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Live trade stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Stream endpoint; the symbol path segment is appended per session
    #[serde(default = "default_stream_url")]
    pub base_url: String,

    /// Minimum gap between UI-visible price updates (milliseconds)
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: i64,

    /// Number of accepted samples kept for charting
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Keepalive ping interval (seconds)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// Upper bound on the initial handshake; unset leaves it to the socket
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

fn default_stream_url() -> String {
    DEFAULT_STREAM_URL.to_string()
}
fn default_update_interval_ms() -> i64 {
    1000
}
fn default_window_size() -> usize {
    300 // ~5 minutes at one sample per second
}
fn default_ping_interval_secs() -> u64 {
    30
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_stream_url(),
            update_interval_ms: default_update_interval_ms(),
            window_size: default_window_size(),
            ping_interval_secs: default_ping_interval_secs(),
            connect_timeout_secs: None,
        }
    }
}

/// Snapshot REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    #[serde(default = "default_rest_url")]
    pub base_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Only pairs quoted in this asset are listed
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
}

fn default_rest_url() -> String {
    DEFAULT_REST_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_quote_asset() -> String {
    "USDT".to_string()
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: default_rest_url(),
            timeout_secs: default_timeout_secs(),
            quote_asset: default_quote_asset(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The example configuration shipped with the crate
    pub fn example() -> anyhow::Result<Self> {
        let config: Config = toml::from_str(include_str!("../config.toml.example"))?;
        Ok(config)
    }

    /// Reject values the streaming core cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.update_interval_ms <= 0 {
            return Err(ConfigError::NonPositiveInterval(
                self.stream.update_interval_ms,
            ));
        }
        if self.stream.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(())
    }
}
