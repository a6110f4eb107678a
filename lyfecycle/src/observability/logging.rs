//! `tracing-subscriber` setup for hosts that have none of their own.

use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber.
///
/// `filter` uses `EnvFilter` syntax (e.g. `"lyfecycle=debug"`); when `None`
/// the `RUST_LOG` environment variable is used, falling back to `info`.
/// Returns false if a global subscriber was already installed.
pub fn init_logging(filter: Option<&str>, json: bool) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.is_ok()
}
