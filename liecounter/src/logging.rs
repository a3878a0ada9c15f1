//! Tracing setup for the scheduled job.
//!
//! Run outcomes are logged at `info` so the scheduler's captured stderr shows
//! whether a check ran and what it decided. `RUST_LOG` overrides the default.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn,liecounter=info";

/// Initialize tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn,liecounter=info` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=liecounter=debug liecounter run
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
