//! ticker-stream: live crypto price streaming client
//!
//! This library provides the core components for:
//! - A single-connection WebSocket transport to the exchange trade stream
//! - Decoding trade payloads into normalized events
//! - Throttling updates to a UI-friendly cadence
//! - A bounded rolling price history for charting
//! - A live session tying these together behind an observable state
//! - One-shot REST snapshots of tradable pairs
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod history;
pub mod market;
pub mod session;
pub mod telemetry;
pub mod throttle;
pub mod ws;
