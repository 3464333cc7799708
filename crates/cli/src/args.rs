//! Command-line arguments and boundary validation
//!
//! Everything here runs before the client is built, so a rejected order
//! never costs a network call.

use clap::Parser;
use tradewire_core::Fixed;
use tradewire_exchanges::binance::{FuturesConfig, MAINNET_URL, OrderSpec, TESTNET_URL};
use tradewire_exchanges::{ExchangeError, OrderMode, OrderSide, OrderType, Result, TimeInForce};

/// Place a single order on Binance USD-M Futures
#[derive(Parser, Clone)]
#[command(name = "tradewire")]
#[command(about = "Signed order entry for Binance USD-M Futures")]
#[command(version)]
pub struct Cli {
    /// Binance API key
    #[arg(long, env = "BINANCE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Binance API secret
    #[arg(long, env = "BINANCE_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Symbol, e.g. BTCUSDT
    #[arg(long)]
    pub symbol: String,

    /// BUY or SELL
    #[arg(long)]
    pub side: OrderSide,

    /// Order type, e.g. MARKET or LIMIT
    #[arg(long = "type")]
    pub order_type: OrderType,

    /// Order quantity
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: Option<f64>,

    /// Limit price (required for LIMIT)
    #[arg(long, allow_negative_numbers = true)]
    pub price: Option<f64>,

    /// GTC, IOC, FOK, GTX or GTD
    #[arg(long)]
    pub time_in_force: Option<TimeInForce>,

    /// Use the futures testnet
    #[arg(long)]
    pub testnet: bool,

    /// Testnet base URL
    #[arg(long, env = "BINANCE_FUTURES_TESTNET_URL", default_value = TESTNET_URL)]
    pub testnet_url: String,

    /// Validate against the test endpoint without placing the order
    #[arg(long)]
    pub test: bool,

    /// Log canonical query, signature and URL of signed calls
    #[arg(long)]
    pub debug: bool,

    /// recvWindow in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub recv_window: u64,

    /// Only reduce an existing position
    #[arg(long)]
    pub reduce_only: bool,

    /// Close the whole position
    #[arg(long)]
    pub close_position: bool,
}

impl Cli {
    pub fn base_url(&self) -> &str {
        if self.testnet { &self.testnet_url } else { MAINNET_URL }
    }

    /// Client configuration. Missing credentials surface when the client
    /// is built.
    pub fn config(&self) -> FuturesConfig {
        FuturesConfig::default()
            .with_credentials(
                self.api_key.clone().unwrap_or_default(),
                self.api_secret.clone().unwrap_or_default(),
            )
            .with_base_url(self.base_url())
            .with_recv_window(self.recv_window)
            .with_debug(self.debug)
    }

    pub fn mode(&self) -> OrderMode {
        OrderMode::from_test_flag(self.test)
    }

    /// Check the order and turn it into an [`OrderSpec`]
    pub fn order_spec(&self) -> Result<OrderSpec> {
        let symbol = self.symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(ExchangeError::InvalidOrder("--symbol is empty".to_string()));
        }

        if self.order_type.requires_price() && self.price.is_none() {
            return Err(ExchangeError::InvalidOrder(format!(
                "{} orders require --price",
                self.order_type
            )));
        }
        if self.order_type == OrderType::Market && self.quantity.is_none() {
            return Err(ExchangeError::InvalidOrder("MARKET orders require --quantity".to_string()));
        }

        let mut spec = OrderSpec::new(symbol, self.side, self.order_type);

        if let Some(quantity) = self.quantity {
            spec = spec.with_quantity(positive("quantity", quantity)?);
        }
        if let Some(price) = self.price {
            spec = spec.with_price(positive("price", price)?);
        }
        if let Some(tif) = self.time_in_force {
            spec = spec.with_time_in_force(tif);
        }
        if self.reduce_only {
            spec = spec.with_reduce_only(true);
        }
        if self.close_position {
            spec = spec.with_close_position(true);
        }

        Ok(spec)
    }
}

fn positive(name: &str, value: f64) -> Result<Fixed> {
    let fixed = Fixed::from_f64(value)
        .map_err(|e| ExchangeError::InvalidOrder(format!("--{name} {value}: {e}")))?;

    if !fixed.is_positive() {
        return Err(ExchangeError::InvalidOrder(format!("--{name} must be positive, got {value}")));
    }
    Ok(fixed)
}
