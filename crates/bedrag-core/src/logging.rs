//! Logging setup
//!
//! ```no_run
//! bedrag_core::logging::init_logging("info").unwrap();
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{Error, Result};

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` overrides `level` when set. Logs go to stderr so they never mix
/// with answers printed on stdout.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Error::Configuration(format!("Failed to init tracing: {}", e)))
}
