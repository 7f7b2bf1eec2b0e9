//! WebSocket transport over tokio-tungstenite

use super::types::{EventSink, TransportError, TransportEvent, WsConfig};
use super::{Transport, NORMAL_CLOSURE};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;

/// Close frame requested by the owner
#[derive(Debug)]
struct CloseRequest {
    code: u16,
    reason: String,
}

/// Handle to the background task of one connection
struct ActiveConnection {
    sink: EventSink,
    shutdown: oneshot::Sender<CloseRequest>,
}

/// Single-connection WebSocket transport with ping/pong keepalive
///
/// Each `open` spawns a task that owns the socket. `close` queues the close
/// frame for the task and then seals the event sink, so nothing is
/// delivered after it returns; if the handshake is still in flight it is
/// abandoned and the socket dropped.
pub struct WsTransport {
    config: WsConfig,
    active: Option<ActiveConnection>,
}

impl WsTransport {
    /// Create a new transport with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    /// Get the transport configuration
    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Drive one connection from handshake to teardown
    async fn run_connection(
        url: String,
        config: WsConfig,
        sink: EventSink,
        mut shutdown: oneshot::Receiver<CloseRequest>,
    ) {
        tracing::info!(url = %url, "Connecting to WebSocket");

        let mut ws_stream = tokio::select! {
            result = Self::handshake(&url, config.connect_timeout) => match result {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket connect failed");
                    sink.emit(TransportEvent::Failed(e));
                    return;
                }
            },
            _ = &mut shutdown => {
                tracing::debug!("Close requested during handshake, abandoning connect");
                return;
            }
        };

        if !sink.emit(TransportEvent::Opened) {
            let _ = ws_stream.close(None).await;
            return;
        }

        tracing::info!("WebSocket connected");

        if let Err(e) = Self::stream(ws_stream, &config, &sink, &mut shutdown).await {
            tracing::warn!(error = %e, "WebSocket connection lost");
            sink.emit(TransportEvent::Failed(e));
        }
    }

    async fn handshake(url: &str, timeout: Option<Duration>) -> Result<WsStream, TransportError> {
        let connect = connect_async(url);
        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => connect.await,
        };

        let (stream, _response) =
            result.map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        Ok(stream)
    }

    /// Pump frames until closed locally (Ok) or lost (Err)
    async fn stream(
        ws_stream: WsStream,
        config: &WsConfig,
        sink: &EventSink,
        shutdown: &mut oneshot::Receiver<CloseRequest>,
    ) -> Result<(), TransportError> {
        let (mut write, mut read) = ws_stream.split();

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // first tick completes immediately
        ping_interval.tick().await;

        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                request = &mut *shutdown => {
                    Self::send_close(&mut write, request.ok()).await;
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if !sink.emit(TransportEvent::Message(text)) {
                                break;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (u16::from(f.code), f.reason.to_string()))
                                .unwrap_or((NORMAL_CLOSURE, String::new()));
                            tracing::info!(code, reason = %reason, "Received close frame");
                            return Err(TransportError::ClosedByPeer { code, reason });
                        }
                        Some(Ok(Message::Binary(data))) => {
                            tracing::trace!(len = data.len(), "Ignoring binary frame");
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            return Err(TransportError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(TransportError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(TransportError::ConnectionFailed("Pong timeout".into()));
                    }
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| TransportError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }
            }
        }

        // sink sealed (request already queued) or receiver gone
        Self::send_close(&mut write, shutdown.try_recv().ok()).await;
        Ok(())
    }

    async fn send_close(write: &mut WsWriter, request: Option<CloseRequest>) {
        let request = request.unwrap_or(CloseRequest {
            code: NORMAL_CLOSURE,
            reason: String::new(),
        });
        let frame = CloseFrame {
            code: CloseCode::from(request.code),
            reason: request.reason.into(),
        };

        if let Err(e) = write.send(Message::Close(Some(frame))).await {
            tracing::debug!(error = %e, "Failed to send close frame");
        }
        let _ = write.close().await;
        tracing::info!(code = request.code, "WebSocket closed");
    }
}

impl Transport for WsTransport {
    fn open(&mut self, url: &str) -> Result<mpsc::UnboundedReceiver<TransportEvent>, TransportError> {
        if self.active.is_some() {
            return Err(TransportError::AlreadyActive);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let (sink, rx) = EventSink::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        runtime.spawn(Self::run_connection(
            url.to_string(),
            self.config.clone(),
            sink.clone(),
            shutdown_rx,
        ));

        self.active = Some(ActiveConnection {
            sink,
            shutdown: shutdown_tx,
        });
        Ok(rx)
    }

    fn close(&mut self, code: u16, reason: &str) {
        let Some(connection) = self.active.take() else {
            return;
        };

        // queued before sealing so a loop stopped by the seal still finds it;
        // the task may already have exited after a failure
        let _ = connection.shutdown.send(CloseRequest {
            code,
            reason: reason.to_string(),
        });
        connection.sink.seal();
        tracing::debug!(code, reason, "Transport close requested");
    }

    fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close(NORMAL_CLOSURE, "Transport dropped");
    }
}
