use clap::Parser;
use ticker_stream::cli::{Cli, Commands};
use ticker_stream::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::example()?
        }
    };

    // Initialize telemetry
    ticker_stream::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::List(args) => {
            args.execute(&config).await?;
        }
        Commands::Watch(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
