//! Futures order construction and placement
//!
//! [`OrderSpec`] carries what the caller asked for; [`build_order_params`]
//! turns it into wire parameters without adding anything the caller did not
//! set. Price in particular is never defaulted.

use crate::binance::query::ParameterMap;
use crate::binance::rest::{ApiResponse, FuturesRestClient, SecurityType};
use crate::binance::types::FuturesOrderResponse;
use crate::errors::Result;
use crate::http::{HttpMethod, HttpTransport};
use crate::types::{OrderMode, OrderSide, OrderType, TimeInForce};
use tradewire_core::{Fixed, log_order};

use tracing::debug;

pub const ORDER_PATH: &str = "/fapi/v1/order";
pub const TEST_ORDER_PATH: &str = "/fapi/v1/order/test";

/// Endpoint for an order mode
pub fn order_path(mode: OrderMode) -> &'static str {
    match mode {
        OrderMode::Live => ORDER_PATH,
        OrderMode::Test => TEST_ORDER_PATH,
    }
}

/// One order request, built per invocation
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Option<Fixed>,
    pub price: Option<Fixed>,
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: Option<bool>,
    pub close_position: Option<bool>,
    /// Merged last; collisions with the fields above are the caller's call
    pub extra: ParameterMap,
}

impl OrderSpec {
    pub fn new(symbol: impl Into<String>, side: OrderSide, order_type: OrderType) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            quantity: None,
            price: None,
            time_in_force: None,
            reduce_only: None,
            close_position: None,
            extra: ParameterMap::new(),
        }
    }

    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Fixed) -> Self {
        Self::new(symbol, side, OrderType::Market).with_quantity(quantity)
    }

    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: Fixed, price: Fixed) -> Self {
        Self::new(symbol, side, OrderType::Limit)
            .with_quantity(quantity)
            .with_price(price)
            .with_time_in_force(TimeInForce::GoodTillCanceled)
    }

    pub fn with_quantity(mut self, quantity: Fixed) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_price(mut self, price: Fixed) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = Some(reduce_only);
        self
    }

    pub fn with_close_position(mut self, close_position: bool) -> Self {
        self.close_position = Some(close_position);
        self
    }

    /// Extension parameter such as `stopPrice` or `newClientOrderId`
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<crate::binance::query::ParamValue>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// Short human description for log lines
    pub fn summary(&self) -> String {
        let mut text = format!("{} {}", self.side, self.order_type);
        if let Some(qty) = &self.quantity {
            text.push_str(&format!(" qty={qty}"));
        }
        if let Some(price) = &self.price {
            text.push_str(&format!(" @ {price}"));
        }
        text
    }
}

/// Wire parameters of an order, before timestamp and signature
pub fn build_order_params(spec: &OrderSpec) -> ParameterMap {
    let mut params = ParameterMap::new();
    params
        .insert("symbol", spec.symbol.as_str())
        .insert("side", spec.side.as_str())
        .insert("type", spec.order_type.as_str())
        .insert("quantity", spec.quantity)
        .insert("price", spec.price)
        .insert("timeInForce", spec.time_in_force.map(|tif| tif.as_str()))
        .insert("reduceOnly", spec.reduce_only)
        .insert("closePosition", spec.close_position);

    params.overlay(&spec.extra);
    params
}

impl<T: HttpTransport> FuturesRestClient<T> {
    /// Place an order, or validate it against the test endpoint
    pub async fn place_order(&self, spec: &OrderSpec, mode: OrderMode) -> Result<ApiResponse> {
        let params = build_order_params(spec);
        let path = order_path(mode);

        debug!("📤 {} order params: {:?}", path, params);

        let response = self.request(HttpMethod::Post, path, params, SecurityType::Signed).await?;

        let action = if mode.is_test() { "TESTED" } else { "PLACED" };
        log_order!(action, spec.symbol, spec.summary());

        Ok(response)
    }

    /// [`place_order`](Self::place_order) with the body decoded
    pub async fn place_order_typed(&self, spec: &OrderSpec, mode: OrderMode) -> Result<FuturesOrderResponse> {
        self.place_order(spec, mode).await?.into_typed()
    }
}
