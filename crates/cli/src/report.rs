//! Balance report printed before an order goes out

use tradewire_core::Fixed;
use tradewire_exchanges::binance::FuturesBalance;
use tracing::info;

pub const MAX_REPORTED_ASSETS: usize = 10;

/// Assets with a positive amount, in exchange order, capped at `limit`
pub fn funded_assets(balances: &[FuturesBalance], limit: usize) -> Vec<(&str, Fixed)> {
    balances
        .iter()
        .filter(|b| !b.asset.is_empty())
        .map(|b| (b.asset.as_str(), b.display_amount()))
        .filter(|(_, amount)| amount.is_positive())
        .take(limit)
        .collect()
}

pub fn log_balances(balances: &[FuturesBalance]) {
    info!("💰 Fetched {} balance entries", balances.len());
    for (asset, amount) in funded_assets(balances, MAX_REPORTED_ASSETS) {
        info!("   {} = {}", asset, amount);
    }
}
