//! CLI interface for ticker-stream
//!
//! Provides subcommands for:
//! - `list`: Show tradable pairs with their last price
//! - `watch`: Stream live prices for one symbol
//! - `config`: Show the effective configuration

mod list;
mod watch;

pub use list::ListArgs;
pub use watch::{format_state, WatchArgs};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ticker-stream")]
#[command(about = "Live crypto price streaming from Binance")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show tradable pairs with their last price
    List(ListArgs),
    /// Stream live prices for one symbol
    Watch(WatchArgs),
    /// Show the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch() {
        let cli = Cli::parse_from([
            "ticker-stream",
            "watch",
            "BTCUSDT",
            "--interval-ms",
            "2000",
            "--retries",
            "1",
        ]);
        match cli.command {
            Commands::Watch(args) => {
                assert_eq!(args.symbol, "BTCUSDT");
                assert_eq!(args.interval_ms, Some(2000));
                assert_eq!(args.retries, 1);
                assert_eq!(args.retry_delay_secs, 5);
                assert!(args.duration_secs.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_parse_list_with_config() {
        let cli = Cli::parse_from(["ticker-stream", "-c", "custom.toml", "list", "--limit", "5"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::List(ListArgs { limit: Some(5) })));
    }
}
