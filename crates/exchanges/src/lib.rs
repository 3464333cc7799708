//! # Tradewire Exchanges
//!
//! Signed REST client for Binance USD-M Futures.
//!
//! ## Architecture
//!
//! - **monoio-based HTTPS transport** behind the [`HttpTransport`] trait
//! - **Canonical query strings** signed with HMAC-SHA256
//! - **Server clock correction** measured once per client
//! - **Fixed-point amounts** that never render in scientific notation

pub mod binance;
pub mod errors;
pub mod http;
pub mod types;

// Re-export main types
pub use binance::{FuturesConfig, FuturesRestClient, OrderSpec};
pub use errors::{ApiRejection, ExchangeError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, MonoioHttpsClient};
pub use types::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::binance::{
        ApiResponse, CanonicalQuery, Credentials, FuturesAccountInfo, FuturesBalance, FuturesConfig,
        FuturesRestClient, OrderSpec, ParamValue, ParameterMap, SecurityType,
    };
    pub use crate::errors::{ExchangeError, Result};
    pub use crate::http::{HttpMethod, HttpTransport, MonoioHttpsClient};
    pub use crate::types::*;
    pub use tradewire_core::prelude::*;
}
