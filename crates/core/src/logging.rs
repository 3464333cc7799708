//! Unified logging integration
//!
//! One tracing-subscriber setup shared by the library's tests and the CLI.
//! `RUST_LOG` always wins over the default directive.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize logging at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    init_logging_with("info");
}

/// Initialize logging with a default filter directive such as `"debug"` or
/// `"tradewire_exchanges=debug"`. Later calls are no-ops.
pub fn init_logging_with(default_directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .try_init()
            .is_ok();

        if installed {
            tracing::debug!("📝 Initialized tracing logging");
        }
    });
}

/// Log an order lifecycle line
#[macro_export]
macro_rules! log_order {
    ($action:expr, $symbol:expr, $detail:expr) => {
        tracing::info!("📋 ORDER {}: {} ({})", $action, $symbol, $detail);
    };
}

/// Log a failed operation
#[macro_export]
macro_rules! log_error {
    ($operation:expr, $error:expr) => {
        tracing::error!("❌ {} failed: {}", $operation, $error);
    };
}
