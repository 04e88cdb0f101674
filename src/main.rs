use clap::{Parser, Subcommand};
use tracing::{info, warn};

use tradegate::AdapterRegistry;
use tradegate_core::config::TradegateConfig;
use tradegate_core::prelude::*;
use tradegate_monitoring::setup_logging;

#[derive(Parser)]
#[command(name = "tradegate")]
#[command(about = "Exchange adapter engine for trading bots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the adapter against the configured exchange
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Force dry-run mode regardless of configuration
        #[arg(long)]
        dry_run: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, dry_run } => run(&config, dry_run).await,
        Commands::Version => {
            println!("tradegate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run(config_path: &str, force_dry_run: bool) -> anyhow::Result<()> {
    let mut config = match TradegateConfig::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "No usable config at {} ({}), falling back to development defaults",
                config_path, e
            );
            TradegateConfig::development()
        }
    };
    if force_dry_run {
        config.trading.dry_run = true;
    }

    setup_logging(&config.monitoring)?;

    let adapter = AdapterRegistry::build(&config)?;
    info!(
        exchange = %adapter.exchange_id(),
        mode = %config.trading.trading_mode,
        dry_run = %config.trading.dry_run,
        "Adapter constructed"
    );

    adapter.additional_init().await?;

    if config.trading.dry_run {
        // Exercise the full order path without touching the exchange.
        let intent =
            OrderIntent::market(Symbol::new("BTC", "USDT"), OrderSide::Buy, Decimal::ONE)
                .with_leverage(2.0);
        let receipt = adapter.place_order(&intent).await?;
        info!(receipt = %receipt, "Dry-run order built");
    } else {
        let positions = adapter.fetch_positions(None).await?;
        info!(count = positions.len(), "Open positions fetched");
        if positions.is_empty() {
            warn!("No open positions on {}", adapter.exchange_id());
        }
    }

    Ok(())
}
