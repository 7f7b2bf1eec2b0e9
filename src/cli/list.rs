//! List command implementation

use crate::config::Config;
use crate::market::{load_listing, BinanceRestClient};
use clap::Args;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show at most this many pairs
    #[arg(long)]
    pub limit: Option<usize>,
}

impl ListArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = BinanceRestClient::new(&config.rest)?;
        let listing = load_listing(&client, &config.rest.quote_asset).await?;

        for row in listing.iter().take(self.limit.unwrap_or(usize::MAX)) {
            println!("{:<14} {:<10} {}", row.symbol, row.name, row.price);
        }
        Ok(())
    }
}
