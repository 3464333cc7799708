//! USD-M futures response types
//!
//! Binance sends every amount as a JSON string; fields stay `String` here and
//! are turned into [`Fixed`] on demand. Fields the report code does not need
//! default so that schema additions on the exchange side never break parsing.

use serde::{Deserialize, Serialize};
use tradewire_core::Fixed;

/// Entry of `GET /fapi/v2/balance`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesBalance {
    pub asset: String,
    #[serde(default)]
    pub account_alias: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default)]
    pub wallet_balance: Option<String>,
    #[serde(default)]
    pub cross_wallet_balance: Option<String>,
    #[serde(default)]
    pub cross_un_pnl: Option<String>,
    #[serde(default)]
    pub available_balance: Option<String>,
    #[serde(default)]
    pub max_withdraw_amount: Option<String>,
    #[serde(default)]
    pub margin_available: Option<bool>,
    #[serde(default)]
    pub update_time: Option<u64>,
}

impl FuturesBalance {
    /// First present of `balance`, `walletBalance`, `crossWalletBalance`.
    ///
    /// Empty strings count as absent. A present but unparseable field counts
    /// as zero rather than falling through to the next one.
    pub fn display_amount(&self) -> Fixed {
        [&self.balance, &self.wallet_balance, &self.cross_wallet_balance]
            .into_iter()
            .find_map(|field| field.as_deref().filter(|raw| !raw.trim().is_empty()))
            .and_then(|raw| Fixed::from_str_exact(raw).ok())
            .unwrap_or(Fixed::ZERO)
    }

    pub fn is_funded(&self) -> bool {
        self.display_amount().is_positive()
    }
}

/// Per-asset block of `GET /fapi/v2/account`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesAsset {
    pub asset: String,
    #[serde(default)]
    pub wallet_balance: Option<String>,
    #[serde(default)]
    pub unrealized_profit: Option<String>,
    #[serde(default)]
    pub margin_balance: Option<String>,
    #[serde(default)]
    pub available_balance: Option<String>,
    #[serde(default)]
    pub cross_wallet_balance: Option<String>,
}

/// Per-symbol position of `GET /fapi/v2/account`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesPosition {
    pub symbol: String,
    #[serde(default)]
    pub position_amt: Option<String>,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub unrealized_profit: Option<String>,
    #[serde(default)]
    pub leverage: Option<String>,
    #[serde(default)]
    pub position_side: Option<String>,
    #[serde(default)]
    pub isolated: Option<bool>,
}

impl FuturesPosition {
    /// Non-zero position size
    pub fn is_open(&self) -> bool {
        self.position_amt
            .as_deref()
            .and_then(|raw| Fixed::from_str_exact(raw).ok())
            .map(|amt| !amt.is_zero())
            .unwrap_or(false)
    }
}

/// Response of `GET /fapi/v2/account`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesAccountInfo {
    #[serde(default)]
    pub fee_tier: Option<u32>,
    #[serde(default)]
    pub can_trade: Option<bool>,
    #[serde(default)]
    pub can_deposit: Option<bool>,
    #[serde(default)]
    pub can_withdraw: Option<bool>,
    #[serde(default)]
    pub total_wallet_balance: Option<String>,
    #[serde(default)]
    pub total_unrealized_profit: Option<String>,
    #[serde(default)]
    pub total_margin_balance: Option<String>,
    #[serde(default)]
    pub available_balance: Option<String>,
    #[serde(default)]
    pub max_withdraw_amount: Option<String>,
    #[serde(default)]
    pub update_time: Option<u64>,
    #[serde(default)]
    pub assets: Vec<FuturesAsset>,
    #[serde(default)]
    pub positions: Vec<FuturesPosition>,
}

impl FuturesAccountInfo {
    pub fn open_positions(&self) -> impl Iterator<Item = &FuturesPosition> {
        self.positions.iter().filter(|p| p.is_open())
    }
}

/// Response of `POST /fapi/v1/order`
///
/// The test endpoint answers `{}`, which parses into all-default fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesOrderResponse {
    #[serde(default)]
    pub order_id: Option<u64>,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default, rename = "type")]
    pub order_type: Option<String>,
    #[serde(default)]
    pub orig_qty: Option<String>,
    #[serde(default)]
    pub executed_qty: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub avg_price: Option<String>,
    #[serde(default)]
    pub time_in_force: Option<String>,
    #[serde(default)]
    pub reduce_only: Option<bool>,
    #[serde(default)]
    pub close_position: Option<bool>,
    #[serde(default)]
    pub update_time: Option<u64>,
}
