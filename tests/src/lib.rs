//! Shared test support for the Tradewire workspace
//!
//! [`MockTransport`] replays canned responses in order and records every
//! request it was handed, so dispatcher behavior can be checked without a
//! network.

use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::VecDeque;

use tradewire_core::{ManualClock, ServerClock, ClockOffset};
use tradewire_exchanges::binance::{FuturesConfig, FuturesRestClient};
use tradewire_exchanges::{ExchangeError, HttpRequest, HttpResponse, HttpTransport, Result};

pub const TEST_API_KEY: &str = "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A";
pub const TEST_SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
pub const TEST_BASE_URL: &str = "https://fapi.mock.test";

/// In-memory transport with queued responses
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<HttpResponse>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, status: u16, content_type: &str, body: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: body.to_string(),
        }));
        self
    }

    pub fn with_json(self, status: u16, body: &str) -> Self {
        self.with_response(status, "application/json", body)
    }

    pub fn with_text(self, status: u16, body: &str) -> Self {
        self.with_response(status, "text/plain", body)
    }

    pub fn with_error(self, error: ExchangeError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    /// `{"serverTime": ...}` answer for client construction
    pub fn with_server_time(self, server_time_ms: u64) -> Self {
        self.with_json(200, &format!(r#"{{"serverTime":{server_time_ms}}}"#))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::NetworkError("no canned response".to_string())))
    }
}

pub fn test_config() -> FuturesConfig {
    FuturesConfig::default()
        .with_credentials(TEST_API_KEY, TEST_SECRET)
        .with_base_url(TEST_BASE_URL)
}

/// Client with a fixed offset and a manual local clock; no construction call
pub fn client_at(
    transport: MockTransport,
    offset_ms: i64,
    local_ms: u64,
) -> (FuturesRestClient<MockTransport>, ManualClock) {
    let local = ManualClock::new(local_ms);
    let clock = ServerClock::new(ClockOffset::from_millis(offset_ms), Box::new(local.clone()));
    let client = FuturesRestClient::with_clock(test_config(), transport, clock)
        .unwrap_or_else(|e| panic!("test client: {e}"));
    (client, local)
}

/// Split a signed URL into `(base and path, canonical query, signature)`
pub fn split_signed_url(url: &str) -> Option<(&str, &str, &str)> {
    let (target, query) = url.split_once('?')?;
    let (canonical, signature) = query.rsplit_once("&signature=")?;
    Some((target, canonical, signature))
}
