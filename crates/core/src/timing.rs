//! Wall-clock access and server clock correction
//!
//! Every signed request carries a `timestamp` taken from a [`ServerClock`]:
//! local wall-clock milliseconds plus a [`ClockOffset`] measured once against
//! the exchange. The offset is a plain value; nothing mutates it after the
//! clock is built.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nanoseconds since the Unix epoch.
#[inline]
pub fn nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Milliseconds since the Unix epoch.
#[inline]
pub fn millis() -> u64 {
    nanos() / 1_000_000
}

/// Render epoch milliseconds as an RFC 3339 UTC string for log lines.
pub fn format_millis(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

/// Source of local wall-clock time in epoch milliseconds.
pub trait LocalClock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl LocalClock for SystemClock {
    fn now_millis(&self) -> u64 {
        millis()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and hand
/// another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.millis.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.millis.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl LocalClock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Signed difference `server - local` in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ClockOffset(i64);

impl ClockOffset {
    pub const ZERO: ClockOffset = ClockOffset(0);

    pub fn from_millis(offset_ms: i64) -> Self {
        Self(offset_ms)
    }

    /// Offset observed when the server reported `server_ms` while the local
    /// clock read `local_ms`.
    pub fn between(server_ms: u64, local_ms: u64) -> Self {
        let diff = i128::from(server_ms) - i128::from(local_ms);
        Self(diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Absolute size of the drift in milliseconds.
    pub fn magnitude(&self) -> u64 {
        self.0.unsigned_abs()
    }

    /// Correct a local reading into server time. Saturates at zero.
    pub fn apply(&self, local_ms: u64) -> u64 {
        let corrected = i128::from(local_ms) + i128::from(self.0);
        corrected.clamp(0, i128::from(u64::MAX)) as u64
    }
}

impl fmt::Display for ClockOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}ms", self.0)
    }
}

/// Local clock corrected by a fixed offset.
pub struct ServerClock {
    offset: ClockOffset,
    local: Box<dyn LocalClock>,
}

impl ServerClock {
    pub fn new(offset: ClockOffset, local: Box<dyn LocalClock>) -> Self {
        Self { offset, local }
    }

    pub fn offset(&self) -> ClockOffset {
        self.offset
    }

    /// Uncorrected local reading.
    pub fn local_millis(&self) -> u64 {
        self.local.now_millis()
    }

    /// `local + offset`, the timestamp for signed requests.
    pub fn now_millis(&self) -> u64 {
        self.offset.apply(self.local.now_millis())
    }
}

impl fmt::Debug for ServerClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerClock")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// Performance measurement utilities
pub struct PerfTimer {
    start: u64,
    name: String,
}

impl PerfTimer {
    /// Start a new performance timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: nanos(),
            name: name.into(),
        }
    }

    /// Get elapsed time in microseconds
    pub fn elapsed_micros(&self) -> u64 {
        nanos().saturating_sub(self.start) / 1_000
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        let micros = self.elapsed_micros();
        if micros < 1000 {
            tracing::debug!("⏱️  {} took {}μs", self.name, micros);
        } else {
            tracing::debug!("⏱️  {} took {:.3}ms", self.name, micros as f64 / 1000.0);
        }
    }
}
