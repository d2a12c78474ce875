//! Logging setup based on `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,vantage_core=debug,vantage_geometry=debug";

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over [`DEFAULT_FILTER`]. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Installs a global `fmt` subscriber with an explicit fallback filter.
pub fn init_with_filter(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::trace!("global subscriber already installed");
    }
}
