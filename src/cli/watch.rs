//! Watch command implementation

use crate::config::Config;
use crate::session::{LiveSession, SessionPhase, SessionState, WsSession};
use crate::ws::Transport;
use clap::Args;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Symbol to stream (e.g. BTCUSDT)
    pub symbol: String,

    /// Minimum gap between printed prices in ms (overrides config)
    #[arg(long)]
    pub interval_ms: Option<i64>,

    /// Stop after this many seconds
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Reconnect attempts after a connection failure
    #[arg(long, default_value = "3")]
    pub retries: u32,

    /// Delay before each reconnect attempt
    #[arg(long, default_value = "5")]
    pub retry_delay_secs: u64,
}

impl WatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let session = WsSession::with_websocket(&config.stream)?;
        self.run(&session, tokio::signal::ctrl_c()).await
    }

    /// Print session updates until `interrupt` resolves, the duration
    /// elapses, or retries run out
    async fn run<T, F>(&self, session: &LiveSession<T>, interrupt: F) -> anyhow::Result<()>
    where
        T: Transport,
        F: Future<Output = std::io::Result<()>>,
    {
        if let Some(interval_ms) = self.interval_ms {
            session.set_update_interval(interval_ms)?;
        }

        let mut updates = session.subscribe();
        session.start(&self.symbol)?;
        tracing::info!(session = %session.id(), symbol = %self.symbol, "Watching live prices");

        let deadline = async {
            match self.duration_secs {
                Some(secs) => sleep(Duration::from_secs(secs)).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(interrupt);

        // armed only while a reconnect is pending
        let retry_delay = sleep(Duration::ZERO);
        tokio::pin!(retry_delay);
        let mut retry_pending = false;

        let mut retries_left = self.retries;
        let result = loop {
            tokio::select! {
                _ = &mut interrupt => {
                    tracing::info!("Interrupted");
                    break Ok(());
                }
                _ = &mut deadline => {
                    tracing::info!("Watch duration elapsed");
                    break Ok(());
                }
                _ = &mut retry_delay, if retry_pending => {
                    retry_pending = false;
                    if let Err(e) = session.retry() {
                        break Err(e.into());
                    }
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                    let state = updates.borrow_and_update().clone();
                    println!("{}", format_state(&state));

                    if state.phase == SessionPhase::Failed {
                        if retries_left == 0 {
                            let cause = state
                                .connection_error
                                .as_ref()
                                .map(|e| e.to_string())
                                .unwrap_or_default();
                            break Err(anyhow::anyhow!(
                                "Stream failed after {} retries: {}",
                                self.retries,
                                cause
                            ));
                        }
                        retries_left -= 1;
                        tracing::warn!(retries_left, "Reconnecting after failure");
                        retry_delay
                            .as_mut()
                            .reset(Instant::now() + Duration::from_secs(self.retry_delay_secs));
                        retry_pending = true;
                    }
                }
            }
        };

        session.close();
        result
    }
}

/// One-line rendering of a session state
pub fn format_state(state: &SessionState) -> String {
    let symbol = state.symbol.as_deref().unwrap_or("-");
    match state.phase {
        SessionPhase::Streaming => {
            let price = state.current_price.as_deref().unwrap_or("...");
            match state.price_range() {
                Some((lo, hi)) => format!(
                    "{symbol} {price} [{} samples, range {lo}-{hi}]",
                    state.history.len()
                ),
                None => format!("{symbol} {price} [waiting for trades]"),
            }
        }
        SessionPhase::Failed => {
            let cause = state
                .connection_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            format!("{symbol} connection error: {cause}")
        }
        phase => format!("{symbol} {phase}"),
    }
}
