//! Logging setup for binaries and embedding applications.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,distrib=debug,sqlx=warn";

/// Installs a `tracing-subscriber` fmt subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_FILTER`]. Calling this again, or after
/// the host application installed its own subscriber, does nothing.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
