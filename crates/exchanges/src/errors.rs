//! Exchange-specific error types
//!
//! One enum covers the whole taxonomy: configuration problems caught before
//! any network activity, transport failures, exchange rejections (non-2xx,
//! body kept verbatim) and malformed responses.

use serde::Deserialize;
use thiserror::Error;

/// Result type for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Exchange operation errors
#[derive(Error, Debug, Clone)]
pub enum ExchangeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Fixed point error: {0}")]
    FixedPointError(String),
}

impl ExchangeError {
    /// Connection, TLS, read/write or timeout failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::Timeout(_))
    }

    /// The exchange answered with a non-2xx status.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::HttpError(..))
    }

    /// Credentials or client settings were unusable.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredentials(_) | Self::InvalidUrl(_))
    }

    /// HTTP status of a rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError(status, _) => Some(*status),
            _ => None,
        }
    }

    /// Exchange error payload of a rejection, when the body is Binance's
    /// `{"code": -2019, "msg": "..."}` shape.
    pub fn rejection(&self) -> Option<ApiRejection> {
        match self {
            Self::HttpError(_, body) => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

/// Error body returned by the exchange alongside a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiRejection {
    pub code: i64,
    pub msg: String,
}

impl From<tradewire_core::FixedError> for ExchangeError {
    fn from(err: tradewire_core::FixedError) -> Self {
        Self::FixedPointError(err.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
