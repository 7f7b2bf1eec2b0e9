//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Raw text frames received from the stream
    TradesReceived,
    /// Trades that passed the throttle and were published
    TradesDelivered,
    /// Trades dropped by the throttle
    TradesThrottled,
    /// Frames that failed to decode
    DecodeFailures,
    /// Transport failures surfaced to the session
    TransportFailures,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Samples retained in the rolling history
    HistoryLength,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Exchange trade time to local decode
    TradeLag,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::TradesReceived => "ticker_stream_trades_received_total",
            CounterMetric::TradesDelivered => "ticker_stream_trades_delivered_total",
            CounterMetric::TradesThrottled => "ticker_stream_trades_throttled_total",
            CounterMetric::DecodeFailures => "ticker_stream_decode_failures_total",
            CounterMetric::TransportFailures => "ticker_stream_transport_failures_total",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::HistoryLength => "ticker_stream_history_length",
        }
    }
}

impl LatencyMetric {
    fn name(self) -> &'static str {
        match self {
            LatencyMetric::TradeLag => "ticker_stream_trade_lag_ms",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    metrics::histogram!(metric.name()).record(duration.as_secs_f64() * 1000.0);
}

/// Serve `/metrics` on all interfaces at `port`
pub(crate) fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))
}
