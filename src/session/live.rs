//! Live session state machine

use super::types::{SessionError, SessionPhase, SessionState};
use crate::config::StreamConfig;
use crate::error::ConfigError;
use crate::feed::{stream_url, TradeDecoder};
use crate::history::RollingHistory;
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use crate::throttle::Throttle;
use crate::ws::{Transport, TransportError, TransportEvent, WsConfig, WsTransport, NORMAL_CLOSURE};
use rust_decimal::prelude::ToPrimitive;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use uuid::Uuid;

/// Session over the WebSocket transport
pub type WsSession = LiveSession<WsTransport>;

/// One live-streaming subscription for a single symbol
///
/// Control calls take `&self` and may come from any thread. Transport
/// events are applied by a background task under the same lock, and only
/// while the connection that produced them is still the current one, so a
/// callback arriving after `close`, `reset` or a failure never touches
/// state. Observers get a fresh [`SessionState`] on every change.
pub struct LiveSession<T: Transport> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    id: Uuid,
    inner: Mutex<Inner<T>>,
    state_tx: watch::Sender<Arc<SessionState>>,
}

struct Inner<T> {
    phase: SessionPhase,
    base_url: String,
    transport: T,
    decoder: Option<TradeDecoder>,
    throttle: Throttle,
    history: RollingHistory,
    current_price: Option<String>,
    connection_error: Option<TransportError>,
    /// Bumped whenever the current connection is abandoned
    generation: u64,
}

impl<T> Inner<T> {
    fn snapshot(&self) -> SessionState {
        SessionState {
            symbol: self.decoder.as_ref().map(|d| d.symbol().to_string()),
            phase: self.phase,
            current_price: self.current_price.clone(),
            history: self.history.snapshot(),
            connection_error: self.connection_error.clone(),
            is_connected: self.phase == SessionPhase::Streaming,
        }
    }
}

impl WsSession {
    /// Create a session backed by a fresh WebSocket transport
    pub fn with_websocket(config: &StreamConfig) -> Result<Self, ConfigError> {
        Self::new(WsTransport::new(WsConfig::from(config)), config)
    }
}

impl<T: Transport> LiveSession<T> {
    /// Create an idle session owning `transport`
    pub fn new(transport: T, config: &StreamConfig) -> Result<Self, ConfigError> {
        let inner = Inner {
            phase: SessionPhase::Idle,
            base_url: config.base_url.clone(),
            transport,
            decoder: None,
            throttle: Throttle::new(config.update_interval_ms)?,
            history: RollingHistory::new(config.window_size)?,
            current_price: None,
            connection_error: None,
            generation: 0,
        };
        let (state_tx, _) = watch::channel(Arc::new(SessionState::default()));

        Ok(Self {
            shared: Arc::new(Shared {
                id: Uuid::new_v4(),
                inner: Mutex::new(inner),
                state_tx,
            }),
        })
    }

    /// Identifier used in log fields
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Observe published states; the receiver starts at the current one
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.shared.state_tx.subscribe()
    }

    /// Latest published state
    pub fn state(&self) -> Arc<SessionState> {
        self.shared.state_tx.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.lock().phase
    }

    pub fn symbol(&self) -> Option<String> {
        self.shared
            .lock()
            .decoder
            .as_ref()
            .map(|d| d.symbol().to_string())
    }

    /// Current throttle interval
    pub fn update_interval(&self) -> Duration {
        self.shared.lock().throttle.min_interval()
    }

    /// Open the stream for `symbol`; only valid while idle
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, symbol: &str) -> Result<(), SessionError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ConfigError::EmptySymbol.into());
        }

        let mut inner = self.shared.lock();
        if inner.phase != SessionPhase::Idle {
            let active = inner
                .decoder
                .as_ref()
                .map(|d| d.symbol().to_string())
                .unwrap_or_default();
            return Err(ConfigError::AlreadyActive {
                symbol: active,
                phase: inner.phase.to_string(),
            }
            .into());
        }

        let decoder = TradeDecoder::new(symbol);
        Shared::connect(&self.shared, &mut inner, decoder.symbol())?;
        inner.decoder = Some(decoder);
        self.shared.publish(&inner);
        Ok(())
    }

    /// Reopen the stream after a failure, keeping symbol and history
    pub fn retry(&self) -> Result<(), SessionError> {
        let mut inner = self.shared.lock();
        let symbol = match (&inner.phase, &inner.decoder) {
            (SessionPhase::Failed, Some(decoder)) => decoder.symbol().to_string(),
            (phase, _) => return Err(ConfigError::NotRetryable(phase.to_string()).into()),
        };

        Shared::connect(&self.shared, &mut inner, &symbol)?;
        self.shared.publish(&inner);
        Ok(())
    }

    /// Change the minimum gap between published prices
    ///
    /// Ignored once the session is closed. Non-positive values are rejected
    /// and the previous interval stays in effect.
    pub fn set_update_interval(&self, interval_ms: i64) -> Result<(), ConfigError> {
        let mut inner = self.shared.lock();
        if inner.phase == SessionPhase::Closed {
            tracing::debug!(session = %self.shared.id, interval_ms, "Session closed, ignoring interval change");
            return Ok(());
        }

        inner.throttle.set_min_interval(interval_ms)?;
        tracing::info!(session = %self.shared.id, interval_ms, "Update interval changed");
        Ok(())
    }

    /// Close the transport and clear all state
    ///
    /// Idempotent. Nothing is published after this returns.
    pub fn close(&self) {
        let mut inner = self.shared.lock();
        if inner.phase == SessionPhase::Closed {
            return;
        }
        self.shared.teardown(&mut inner, SessionPhase::Closed);
        tracing::info!(session = %self.shared.id, "Session closed");
    }

    /// Close the transport and return to idle so a new symbol can be started
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        self.shared.teardown(&mut inner, SessionPhase::Idle);
        tracing::info!(session = %self.shared.id, "Session reset");
    }
}

impl<T: Transport> Drop for LiveSession<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Transport> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner<T>) {
        self.state_tx.send_replace(Arc::new(inner.snapshot()));
    }

    /// Open the transport and spawn the event pump for the new connection
    fn connect(this: &Arc<Self>, inner: &mut Inner<T>, symbol: &str) -> Result<(), SessionError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let url = stream_url(&inner.base_url, symbol);
        let events = inner.transport.open(&url)?;

        inner.generation += 1;
        inner.phase = SessionPhase::Connecting;
        inner.connection_error = None;

        tracing::info!(session = %this.id, symbol, url = %url, "Session connecting");
        runtime.spawn(Self::pump(Arc::downgrade(this), inner.generation, events));
        Ok(())
    }

    /// Release the transport, invalidate in-flight events and clear state
    fn teardown(&self, inner: &mut Inner<T>, next: SessionPhase) {
        inner.transport.close(NORMAL_CLOSURE, "Session closed");
        inner.generation += 1;
        inner.phase = next;
        inner.decoder = None;
        inner.throttle.reset();
        inner.history.reset();
        inner.current_price = None;
        inner.connection_error = None;
        self.publish(inner);
    }

    async fn pump(
        shared: Weak<Self>,
        generation: u64,
        mut events: mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        while let Some(event) = events.recv().await {
            let Some(shared) = shared.upgrade() else {
                break;
            };
            if !shared.apply(generation, event, Instant::now()) {
                break;
            }
        }
    }

    /// Apply one transport event; returns false once the connection is stale
    fn apply(&self, generation: u64, event: TransportEvent, now: Instant) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation || !inner.phase.is_live() {
            tracing::trace!(session = %self.id, "Dropping event from stale connection");
            return false;
        }

        match event {
            TransportEvent::Opened => {
                if inner.phase == SessionPhase::Connecting {
                    inner.phase = SessionPhase::Streaming;
                    tracing::info!(session = %self.id, "Session streaming");
                    self.publish(&inner);
                }
                true
            }
            TransportEvent::Message(text) => {
                if inner.phase == SessionPhase::Streaming {
                    self.on_message(&mut inner, &text, now);
                }
                true
            }
            TransportEvent::Failed(error) => {
                tracing::warn!(session = %self.id, error = %error, "Session failed");
                telemetry::increment(CounterMetric::TransportFailures);

                inner.transport.close(NORMAL_CLOSURE, "Connection failed");
                inner.generation += 1;
                inner.phase = SessionPhase::Failed;
                inner.connection_error = Some(error);
                self.publish(&inner);
                false
            }
        }
    }

    fn on_message(&self, inner: &mut Inner<T>, text: &str, now: Instant) {
        telemetry::increment(CounterMetric::TradesReceived);

        let decoded = match &inner.decoder {
            Some(decoder) => decoder.decode(text),
            None => return,
        };
        let trade = match decoded {
            Ok(trade) => trade,
            Err(e) => {
                tracing::debug!(session = %self.id, error = %e, "Skipping undecodable message");
                telemetry::increment(CounterMetric::DecodeFailures);
                return;
            }
        };

        if !inner.throttle.should_deliver(now) {
            tracing::trace!(session = %self.id, price = %trade.price, "Trade throttled");
            telemetry::increment(CounterMetric::TradesThrottled);
            return;
        }

        let Some(price) = trade.price.to_f64() else {
            tracing::debug!(session = %self.id, price = %trade.price, "Price not representable, skipping");
            return;
        };

        inner.history.append(price);
        inner.current_price = Some(trade.display_price());
        inner.throttle.record_delivered(now);

        let lag = trade.exchange_lag();
        if let Some(lag) = lag {
            telemetry::record_latency(LatencyMetric::TradeLag, lag);
        }
        telemetry::increment(CounterMetric::TradesDelivered);
        telemetry::set_gauge(GaugeMetric::HistoryLength, inner.history.len() as f64);

        tracing::trace!(
            session = %self.id,
            price = %trade.price,
            lag_ms = lag.map(|d| d.as_millis() as u64),
            "Trade delivered"
        );
        self.publish(inner);
    }
}
