//! Live price session
//!
//! Ties transport, decoder, throttle and history into one subscription
//! lifecycle for a single symbol:
//!
//! ```text
//! Idle -> Connecting -> Streaming -> Closed
//!            |             |
//!            +--> Failed <-+      (retry: Failed -> Connecting)
//! ```

mod live;
mod types;

pub use live::{LiveSession, WsSession};
pub use types::{SessionError, SessionPhase, SessionState};
