//! Tracing subscriber setup

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, prelude::*};

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` wins, otherwise the configured level.
/// `verbose` raises this crate to debug.
fn env_filter(logging: &LoggingConfig, verbose: bool) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&logging.level)?;
    if verbose {
        filter = filter.add_directive("worktohome=debug".parse()?);
    }
    Ok(filter)
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = env_filter(logging, verbose)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match logging.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to set up tracing subscriber: {e}"))
}
