//! Server clock synchronization
//!
//! One `GET /fapi/v1/time` at client construction. A failed fetch is never
//! fatal: the client falls back to a zero offset and keeps going.

use crate::errors::{ExchangeError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpTransport};

use serde::Deserialize;
use tracing::{debug, info, warn};
use tradewire_core::timing::format_millis;
use tradewire_core::{ClockOffset, LocalClock};

/// Public server-time endpoint
pub const SERVER_TIME_PATH: &str = "/fapi/v1/time";

/// Offsets beyond this are reported; signed requests are likely to be
/// rejected with the default receive window.
pub const OFFSET_WARN_THRESHOLD_MS: u64 = 5_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerTime {
    #[serde(default)]
    server_time: Option<u64>,
}

/// Fetch the exchange's clock in epoch milliseconds. Sent without the API key.
pub async fn fetch_server_time<T: HttpTransport + ?Sized>(transport: &T, base_url: &str) -> Result<u64> {
    let request = HttpRequest::new(HttpMethod::Get, format!("{base_url}{SERVER_TIME_PATH}"));

    let response = transport.send(request).await?;
    if !response.is_success() {
        return Err(ExchangeError::HttpError(response.status, response.body));
    }

    let parsed: ServerTime = serde_json::from_str(&response.body)
        .map_err(|e| ExchangeError::InvalidResponse(format!("server time: {e}")))?;

    match parsed.server_time {
        Some(ms) if ms > 0 => Ok(ms),
        _ => Err(ExchangeError::InvalidResponse(format!(
            "server time missing in '{}'",
            response.body
        ))),
    }
}

/// Whether an offset is past [`OFFSET_WARN_THRESHOLD_MS`]
pub fn is_large_offset(offset: ClockOffset) -> bool {
    offset.magnitude() > OFFSET_WARN_THRESHOLD_MS
}

/// Measure `serverTime - localTimeAfterFetch`.
///
/// Any failure is logged and yields [`ClockOffset::ZERO`].
pub async fn synchronize<T: HttpTransport + ?Sized>(
    transport: &T,
    base_url: &str,
    local: &dyn LocalClock,
) -> ClockOffset {
    match fetch_server_time(transport, base_url).await {
        Ok(server_ms) => {
            let local_ms = local.now_millis();
            let offset = ClockOffset::between(server_ms, local_ms);

            debug!(
                "🕐 Server time {} / local {} / offset {}",
                format_millis(server_ms),
                format_millis(local_ms),
                offset
            );

            if is_large_offset(offset) {
                warn!("⚠️ Large clock offset against exchange: {}", offset);
            } else {
                info!("🕐 Clock synchronized with exchange (offset {})", offset);
            }
            offset
        }
        Err(e) => {
            warn!("⚠️ Server time sync failed, using local clock: {}", e);
            ClockOffset::ZERO
        }
    }
}
