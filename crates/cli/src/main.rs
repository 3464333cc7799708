//! Tradewire CLI
//!
//! Builds the futures client, reports funded balances, then places one order
//! (or validates it with `--test`). Exit code 1 on invalid input, client
//! construction failure or order failure.

mod args;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tradewire_core::init_logging_with;
use tradewire_exchanges::FuturesRestClient;

use args::Cli;

#[monoio::main(enable_timer = true)]
async fn main() -> ExitCode {
    // .env must be loaded before clap resolves env fallbacks
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging_with(if cli.debug { "debug" } else { "info" });

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let spec = cli.order_spec().context("Invalid order")?;
    let mode = cli.mode();
    let config = cli.config();

    info!(
        "🚀 Tradewire starting (base={}, recvWindow={}, debug={})",
        config.base_url, config.recv_window_ms, config.debug
    );

    let client = FuturesRestClient::new(config)
        .await
        .context("Failed creating client")?;

    match client.get_balances().await {
        Ok(balances) => report::log_balances(&balances),
        Err(e) => warn!("⚠️ Failed to fetch balances: {}", e),
    }

    info!(
        "📤 Placing order symbol={} {} test={}",
        spec.symbol,
        spec.summary(),
        mode.is_test()
    );

    let response = client
        .place_order(&spec, mode)
        .await
        .context("Order placement failed")?;

    info!("✅ Order response: {}", response);
    Ok(())
}
