//! Stream transport
//!
//! One physical WebSocket connection per open/close cycle. Connection
//! callbacks are delivered as [`TransportEvent`]s over a channel that is
//! handed back from [`Transport::open`].

mod client;
mod types;

pub use client::WsTransport;
pub use types::{EventSink, TransportError, TransportEvent, WsConfig};

use tokio::sync::mpsc;

/// Normal closure code sent with the close frame
pub const NORMAL_CLOSURE: u16 = 1000;

/// Trait for streaming transport implementations
///
/// Implementations must emit nothing once `close` has returned, and must
/// treat `close` on an inactive transport as a no-op.
pub trait Transport: Send + 'static {
    /// Open a connection to `url`
    ///
    /// Fails with [`TransportError::AlreadyActive`] if a previous connection
    /// has not been closed.
    fn open(&mut self, url: &str) -> Result<mpsc::UnboundedReceiver<TransportEvent>, TransportError>;

    /// Terminate the connection, if any
    fn close(&mut self, code: u16, reason: &str);

    /// Whether a connection is currently held
    fn is_active(&self) -> bool;
}
