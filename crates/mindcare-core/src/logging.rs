//! Logging setup

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is a
/// no-op.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
