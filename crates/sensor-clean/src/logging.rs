//! Tracing subscriber setup

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global subscriber
///
/// INFO by default, DEBUG when `verbose`. `RUST_LOG` takes precedence when set.
pub fn init_logging(verbose: bool, json: bool) -> Result<(), SetGlobalDefaultError> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.with_ansi(true).finish())
    }
}
