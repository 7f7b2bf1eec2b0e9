//! Transport types and configuration

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// WebSocket transport configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Interval for sending keepalive ping frames
    pub ping_interval: Duration,
    /// Optional bound on the opening handshake
    pub connect_timeout: Option<Duration>,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
            connect_timeout: None,
        }
    }
}

impl WsConfig {
    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = Some(d);
        self
    }
}

impl From<&crate::config::StreamConfig> for WsConfig {
    fn from(config: &crate::config::StreamConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_secs.max(1)),
            connect_timeout: config.connect_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Connection callbacks, in delivery order for a single connection
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Handshake completed
    Opened,
    /// Text frame received
    Message(String),
    /// Connection failed before or after opening; nothing follows this
    Failed(TransportError),
}

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// `open` called while a connection is still held
    #[error("Transport already active")]
    AlreadyActive,
    /// Connection refused, reset or dropped
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Handshake did not finish in time
    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),
    /// Server sent a close frame
    #[error("Connection closed by server ({code}): {reason}")]
    ClosedByPeer { code: u16, reason: String },
    /// Writing to the socket failed
    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Sending half of a transport's event channel
///
/// Once [`EventSink::seal`] returns no further event is emitted. The gate
/// is checked and the event queued under one lock, so a seal cannot
/// interleave with an emit.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<TransportEvent>,
    open: Arc<Mutex<bool>>,
}

impl EventSink {
    /// Create a sink and the receiver it feeds
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            tx,
            open: Arc::new(Mutex::new(true)),
        };
        (sink, rx)
    }

    /// Queue an event; returns false if the sink is sealed or the receiver is gone
    pub fn emit(&self, event: TransportEvent) -> bool {
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if !*open {
            return false;
        }
        self.tx.send(event).is_ok()
    }

    /// Stop all further emission
    pub fn seal(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    #[cfg(test)]
    pub(crate) fn is_open(&self) -> bool {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) && !self.tx.is_closed()
    }
}
