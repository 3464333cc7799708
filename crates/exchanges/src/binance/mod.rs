//! Binance USD-M Futures integration
//!
//! Request path of every signed call:
//! parameters → [`CanonicalQuery`] → [`auth::sign`] → [`FuturesRestClient::request`]
//!
//! The clock offset is measured once when the client is built and stays fixed
//! for the client's lifetime.

pub mod auth;
pub mod clock;
pub mod orders;
pub mod query;
pub mod rest;
pub mod types;

pub use auth::{API_KEY_HEADER, Credentials, sign};
pub use clock::{fetch_server_time, is_large_offset, synchronize};
pub use orders::{OrderSpec, build_order_params, order_path};
pub use query::{CanonicalQuery, ParamValue, ParameterMap, encode_component};
pub use rest::{
    ApiResponse, FuturesConfig, FuturesRestClient, MAINNET_URL, SecurityType, TESTNET_URL,
    stamp_signed_params,
};
pub use types::{FuturesAccountInfo, FuturesAsset, FuturesBalance, FuturesOrderResponse, FuturesPosition};
