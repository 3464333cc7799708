//! Binance USD-M Futures REST client
//!
//! Every call goes through [`FuturesRestClient::request`]:
//! - **Signed** requests get `timestamp`/`recvWindow` stamped from the
//!   server-corrected clock, are canonicalized, signed and sent with the
//!   signature appended to the exact string that was signed
//! - **Public** requests pass their parameters through the URL query builder
//!
//! Exactly one HTTP call per invocation. Nothing is retried.

use crate::binance::auth::{API_KEY_HEADER, Credentials};
use crate::binance::clock;
use crate::binance::query::{CanonicalQuery, ParameterMap};
use crate::binance::types::{FuturesAccountInfo, FuturesBalance};
use crate::errors::{ExchangeError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, MonoioHttpsClient};
use tradewire_core::{LocalClock, PerfTimer, ServerClock, SystemClock, log_error};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

pub const MAINNET_URL: &str = "https://fapi.binance.com";
pub const TESTNET_URL: &str = "https://testnet.binancefuture.com";
pub const DEFAULT_RECV_WINDOW_MS: u64 = 5_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const PING_PATH: &str = "/fapi/v1/ping";
const ACCOUNT_PATH: &str = "/fapi/v2/account";
const BALANCE_PATH: &str = "/fapi/v2/balance";

/// Futures client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct FuturesConfig {
    pub api_key: String,
    #[serde(skip_serializing, default)]
    pub api_secret: String,
    pub base_url: String,
    pub testnet: bool,
    pub recv_window_ms: u64,
    pub timeout_ms: u64,
    /// Log canonical query, signature and final URL of every signed call
    pub debug: bool,
}

impl Default for FuturesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: MAINNET_URL.to_string(),
            testnet: false,
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug: false,
        }
    }
}

impl FuturesConfig {
    pub fn testnet() -> Self {
        Self {
            base_url: TESTNET_URL.to_string(),
            testnet: true,
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self.api_secret = api_secret.into();
        self
    }

    pub fn with_env_credentials(mut self) -> Result<Self> {
        let api_key = std::env::var("BINANCE_API_KEY")
            .map_err(|_| ExchangeError::MissingCredentials("BINANCE_API_KEY".to_string()))?;
        let api_secret = std::env::var("BINANCE_API_SECRET")
            .map_err(|_| ExchangeError::MissingCredentials("BINANCE_API_SECRET".to_string()))?;

        self.api_key = api_key;
        self.api_secret = api_secret;
        Ok(self)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window_ms = recv_window_ms;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Trimmed, non-empty credentials
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::new(&self.api_key, &self.api_secret)
    }

    /// Base URL without a trailing slash, checked for scheme and host
    pub fn normalized_base_url(&self) -> Result<String> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed)?;

        if !matches!(parsed.scheme(), "https" | "http") {
            return Err(ExchangeError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                parsed.scheme(),
                trimmed
            )));
        }
        if parsed.host_str().is_none() {
            return Err(ExchangeError::InvalidUrl(format!("no host in {trimmed}")));
        }

        Ok(trimmed.to_string())
    }
}

impl fmt::Debug for FuturesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuturesConfig")
            .field("api_key", &crate::binance::auth::mask(&self.api_key))
            .field("api_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("testnet", &self.testnet)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("timeout_ms", &self.timeout_ms)
            .field("debug", &self.debug)
            .finish()
    }
}

/// Whether an endpoint needs a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityType {
    Public,
    Signed,
}

/// Add `timestamp` and `recvWindow` unless the caller already set them.
///
/// A key holding `Null` counts as unset.
pub fn stamp_signed_params(params: &mut ParameterMap, now_ms: u64, recv_window_ms: u64) {
    params.set_default("timestamp", now_ms);
    params.set_default("recvWindow", recv_window_ms);
}

/// A successful response body
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Text(String),
}

impl ApiResponse {
    /// Classify an HTTP response: non-2xx is a rejection carrying the body
    /// verbatim; a JSON content type must parse.
    pub fn from_http(response: HttpResponse) -> Result<Self> {
        if !response.is_success() {
            return Err(ExchangeError::HttpError(response.status, response.body));
        }

        if response.is_json() {
            let value = serde_json::from_str(&response.body).map_err(|e| {
                ExchangeError::InvalidResponse(format!("malformed JSON ({e}): {}", response.body))
            })?;
            Ok(ApiResponse::Json(value))
        } else {
            Ok(ApiResponse::Text(response.body))
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Text(_) => None,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, ApiResponse::Json(_))
    }

    /// Deserialize a JSON payload; text is a malformed response here
    pub fn into_typed<R: DeserializeOwned>(self) -> Result<R> {
        match self {
            ApiResponse::Json(value) => serde_json::from_value(value)
                .map_err(|e| ExchangeError::InvalidResponse(e.to_string())),
            ApiResponse::Text(text) => Err(ExchangeError::InvalidResponse(format!(
                "expected JSON, got text: {text}"
            ))),
        }
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiResponse::Json(value) => write!(f, "{value}"),
            ApiResponse::Text(text) => f.write_str(text),
        }
    }
}

/// Authenticated Binance USD-M Futures client
pub struct FuturesRestClient<T: HttpTransport = MonoioHttpsClient> {
    config: FuturesConfig,
    credentials: Credentials,
    base_url: String,
    clock: ServerClock,
    transport: T,
}

impl FuturesRestClient<MonoioHttpsClient> {
    /// Validate configuration, then synchronize with the exchange clock.
    ///
    /// Credentials and base URL are checked before any network activity.
    pub async fn new(config: FuturesConfig) -> Result<Self> {
        config.credentials()?;
        config.normalized_base_url()?;

        let transport = MonoioHttpsClient::with_timeout(config.timeout())?;
        Self::with_transport(config, transport, Box::new(SystemClock)).await
    }
}

impl<T: HttpTransport> FuturesRestClient<T> {
    /// Build on an arbitrary transport and local clock, synchronizing once
    pub async fn with_transport(config: FuturesConfig, transport: T, local: Box<dyn LocalClock>) -> Result<Self> {
        let credentials = config.credentials()?;
        let base_url = config.normalized_base_url()?;

        info!("🔗 Binance futures client for {}", base_url);

        let offset = clock::synchronize(&transport, &base_url, local.as_ref()).await;

        Ok(Self {
            config,
            credentials,
            base_url,
            clock: ServerClock::new(offset, local),
            transport,
        })
    }

    /// Build with an already known clock; no network activity
    pub fn with_clock(config: FuturesConfig, transport: T, clock: ServerClock) -> Result<Self> {
        let credentials = config.credentials()?;
        let base_url = config.normalized_base_url()?;

        Ok(Self {
            config,
            credentials,
            base_url,
            clock,
            transport,
        })
    }

    pub fn config(&self) -> &FuturesConfig {
        &self.config
    }

    pub fn clock(&self) -> &ServerClock {
        &self.clock
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one request and classify the outcome
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        params: ParameterMap,
        security: SecurityType,
    ) -> Result<ApiResponse> {
        let url = match security {
            SecurityType::Signed => self.signed_url(path, params)?,
            SecurityType::Public => self.public_url(path, &params)?,
        };

        let request = HttpRequest::new(method, url)
            .with_header(API_KEY_HEADER, self.credentials.api_key());

        let _timer = PerfTimer::start(format!("{method} {path}"));

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                log_error!(format!("{method} {path}"), e);
                return Err(e);
            }
        };

        if !response.is_success() {
            error!("❌ {} {} rejected with HTTP {}: {}", method, path, response.status, response.body);
        }

        ApiResponse::from_http(response)
    }

    fn signed_url(&self, path: &str, mut params: ParameterMap) -> Result<String> {
        stamp_signed_params(&mut params, self.clock.now_millis(), self.config.recv_window_ms);

        let canonical = CanonicalQuery::build(&params);
        let signature = self.credentials.sign(canonical.as_str())?;
        let url = format!("{}{}?{}", self.base_url, path, canonical.with_signature(&signature));

        if self.config.debug {
            debug!("🔏 Query string: {}", canonical);
            debug!("🔏 Signature: {}", signature);
            debug!("🔏 URL: {}", url);
        }

        Ok(url)
    }

    fn public_url(&self, path: &str, params: &ParameterMap) -> Result<String> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;

        let mut present = params.present().peekable();
        if present.peek().is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in present {
                pairs.append_pair(key, &value);
            }
        }

        Ok(url.to_string())
    }

    /// Connectivity check
    pub async fn ping(&self) -> Result<()> {
        self.request(HttpMethod::Get, PING_PATH, ParameterMap::new(), SecurityType::Public)
            .await?;
        Ok(())
    }

    /// Exchange clock in epoch milliseconds
    pub async fn server_time(&self) -> Result<u64> {
        clock::fetch_server_time(&self.transport, &self.base_url).await
    }

    /// `GET /fapi/v2/account`
    pub async fn get_account_info(&self) -> Result<FuturesAccountInfo> {
        self.request(HttpMethod::Get, ACCOUNT_PATH, ParameterMap::new(), SecurityType::Signed)
            .await?
            .into_typed()
    }

    /// `GET /fapi/v2/balance`
    pub async fn get_balances(&self) -> Result<Vec<FuturesBalance>> {
        self.request(HttpMethod::Get, BALANCE_PATH, ParameterMap::new(), SecurityType::Signed)
            .await?
            .into_typed()
    }
}
