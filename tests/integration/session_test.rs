//! Integration tests for the live session, driven by a scripted transport

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use ticker_stream::config::StreamConfig;
use ticker_stream::error::ConfigError;
use ticker_stream::session::{LiveSession, SessionError, SessionPhase, SessionState};
use ticker_stream::ws::{Transport, TransportError, TransportEvent};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

#[derive(Default)]
struct Script {
    sender: Option<mpsc::UnboundedSender<TransportEvent>>,
    active: bool,
    opens: Vec<String>,
    closes: usize,
}

/// Transport whose callbacks are fired by the test
#[derive(Clone, Default)]
struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    /// Fire a callback the way a well-behaved transport would
    fn emit(&self, event: TransportEvent) {
        let script = self.script();
        if script.active {
            script.sender.as_ref().unwrap().send(event).unwrap();
        }
    }

    /// Fire a callback even though the transport was closed
    fn emit_late(&self, event: TransportEvent) {
        if let Some(sender) = self.script().sender.as_ref() {
            let _ = sender.send(event);
        }
    }
}

impl Transport for ScriptedTransport {
    fn open(&mut self, url: &str) -> Result<mpsc::UnboundedReceiver<TransportEvent>, TransportError> {
        let mut script = self.script();
        if script.active {
            return Err(TransportError::AlreadyActive);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        script.sender = Some(tx);
        script.active = true;
        script.opens.push(url.to_string());
        Ok(rx)
    }

    fn close(&mut self, _code: u16, _reason: &str) {
        let mut script = self.script();
        if script.active {
            script.active = false;
            script.closes += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.script().active
    }
}

fn stream_config(interval_ms: i64) -> StreamConfig {
    StreamConfig {
        base_url: "wss://stream.test/ws".to_string(),
        update_interval_ms: interval_ms,
        window_size: 300,
        ..Default::default()
    }
}

fn new_session(interval_ms: i64) -> (LiveSession<ScriptedTransport>, ScriptedTransport) {
    let transport = ScriptedTransport::default();
    let session = LiveSession::new(transport.clone(), &stream_config(interval_ms)).unwrap();
    (session, transport)
}

fn trade(price: &str) -> TransportEvent {
    TransportEvent::Message(format!(r#"{{"e":"trade","s":"BTCUSDT","p":"{price}"}}"#))
}

async fn next_state(rx: &mut watch::Receiver<Arc<SessionState>>) -> Arc<SessionState> {
    timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("Test timed out")
        .unwrap();
    rx.borrow_and_update().clone()
}

#[tokio::test]
async fn test_full_lifecycle() {
    let (session, transport) = new_session(1000);
    let mut rx = session.subscribe();

    session.start("BTCUSDT").unwrap();
    assert_eq!(next_state(&mut rx).await.phase, SessionPhase::Connecting);
    assert_eq!(transport.script().opens, vec!["wss://stream.test/ws/btcusdt@trade"]);

    transport.emit(TransportEvent::Opened);
    let state = next_state(&mut rx).await;
    assert_eq!(state.phase, SessionPhase::Streaming);
    assert!(state.is_connected);

    transport.emit(trade("67321.50"));
    let state = next_state(&mut rx).await;
    assert_eq!(state.current_price.as_deref(), Some("67321.50"));
    assert_eq!(state.history.len(), 1);

    session.close();
    let state = next_state(&mut rx).await;
    assert_eq!(state.phase, SessionPhase::Closed);
    assert!(state.history.is_empty());
    assert_eq!(transport.script().closes, 1);
}

#[tokio::test]
async fn test_throttled_and_malformed_messages_are_not_published() {
    let (session, transport) = new_session(60_000);
    let mut rx = session.subscribe();
    session.start("btcusdt").unwrap();
    next_state(&mut rx).await;

    transport.emit(TransportEvent::Opened);
    next_state(&mut rx).await;

    transport.emit(trade("100.00"));
    let state = next_state(&mut rx).await;
    assert_eq!(state.current_price.as_deref(), Some("100.00"));

    // events are applied in order, so the next publish is the failure
    transport.emit(trade("101.00"));
    transport.emit(TransportEvent::Message(r#"{"x":"bad"}"#.to_string()));
    transport.emit(TransportEvent::Failed(TransportError::ConnectionFailed(
        "reset".to_string(),
    )));

    let state = next_state(&mut rx).await;
    assert_eq!(state.phase, SessionPhase::Failed);
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.current_price.as_deref(), Some("100.00"));
    assert_eq!(
        state.connection_error,
        Some(TransportError::ConnectionFailed("reset".to_string()))
    );
    assert_eq!(transport.script().closes, 1);
}

#[tokio::test]
async fn test_retry_after_failure() {
    let (session, transport) = new_session(1000);
    let mut rx = session.subscribe();
    session.start("btcusdt").unwrap();
    next_state(&mut rx).await;

    transport.emit(TransportEvent::Failed(TransportError::ConnectionFailed(
        "refused".to_string(),
    )));
    assert_eq!(next_state(&mut rx).await.phase, SessionPhase::Failed);

    session.retry().unwrap();
    let state = next_state(&mut rx).await;
    assert_eq!(state.phase, SessionPhase::Connecting);
    assert!(state.connection_error.is_none());

    transport.emit(TransportEvent::Opened);
    assert!(next_state(&mut rx).await.is_connected);
    assert_eq!(transport.script().opens.len(), 2);
}

#[tokio::test]
async fn test_late_open_after_close_is_ignored() {
    let (session, transport) = new_session(1000);
    let mut rx = session.subscribe();
    session.start("btcusdt").unwrap();
    next_state(&mut rx).await;

    session.close();
    assert_eq!(next_state(&mut rx).await.phase, SessionPhase::Closed);

    transport.emit_late(TransportEvent::Opened);
    transport.emit_late(trade("1.00"));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!rx.has_changed().unwrap());
    assert_eq!(session.phase(), SessionPhase::Closed);
    assert!(!session.state().is_connected);
}

#[tokio::test]
async fn test_second_start_leaves_first_connection_alone() {
    let (session, transport) = new_session(1000);
    session.start("btcusdt").unwrap();

    let err = session.start("ethusdt").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Config(ConfigError::AlreadyActive { .. })
    ));

    let script = transport.script();
    assert_eq!(script.opens.len(), 1);
    assert_eq!(script.closes, 0);
    assert!(script.active);
}

#[tokio::test]
async fn test_interval_change_is_validated() {
    let (session, transport) = new_session(1000);
    let mut rx = session.subscribe();
    session.start("btcusdt").unwrap();
    next_state(&mut rx).await;
    transport.emit(TransportEvent::Opened);
    next_state(&mut rx).await;

    tokio_test::assert_err!(session.set_update_interval(0));
    tokio_test::assert_err!(session.set_update_interval(-5));
    assert_eq!(session.update_interval(), Duration::from_millis(1000));

    tokio_test::assert_ok!(session.set_update_interval(1));
    transport.emit(trade("1.00"));
    next_state(&mut rx).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    transport.emit(trade("2.00"));
    let state = next_state(&mut rx).await;
    assert_eq!(state.history.len(), 2);
}
