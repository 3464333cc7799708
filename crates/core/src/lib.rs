//! # Tradewire Core
//!
//! Shared building blocks for the Tradewire exchange client.
//!
//! ## Contents
//!
//! 1. **Clock offset** - local-to-server time correction, fixed once at startup
//! 2. **Fixed-point values** - exact decimals that never render in scientific notation
//! 3. **Unified logging** - tracing-subscriber setup and logging macros
//! 4. **Latency timing** - `PerfTimer` for request timing

pub mod timing;
pub mod fixed;
pub mod logging;

// Re-export commonly used items
pub use timing::{nanos, millis, ClockOffset, LocalClock, ManualClock, PerfTimer, ServerClock, SystemClock};
pub use fixed::{Fixed, FixedError};
pub use logging::{init_logging, init_logging_with};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::timing::{nanos, millis, ClockOffset, LocalClock, ManualClock, PerfTimer, ServerClock, SystemClock};
    pub use crate::fixed::{Fixed, FixedError};
    pub use crate::logging::{init_logging, init_logging_with};

    // Common external types
    pub use serde::{Deserialize, Serialize};
    pub use chrono::{DateTime, Utc};
}
