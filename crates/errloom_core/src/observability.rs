//! Tracing subscriber initialization.

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber writing formatted events to stderr.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this more than
/// once is harmless; later calls leave the first subscriber in place and
/// return `Ok(false)`.
///
/// # Errors
///
/// Returns a message if `default_filter` is not a valid filter directive.
pub fn init_tracing(default_filter: &str) -> Result<bool, String> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| format!("Invalid tracing filter '{}': {}", default_filter, e))?,
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        info!(default_filter, "Tracing initialized");
    } else {
        debug!("Tracing subscriber already installed");
    }
    Ok(installed)
}
