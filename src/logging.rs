//! Logging configuration for Adsight.
//!
//! The server logs to stderr; verbosity is controlled via `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Initializes logging for the server process.
///
/// Honors `RUST_LOG` when set, defaulting to `info` otherwise.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
