//! File-backed tracing setup.
//!
//! Stdout belongs to the chat transcript, so logs only go to the file named by
//! [`crate::config::WRITE_LOG_ENV_VAR`]. `RUST_LOG` selects the filter.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::config::EnvConfig;

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber when a log file is configured.
///
/// Returns `Ok(false)` when logging is disabled.
pub fn init_logging(config: &EnvConfig) -> io::Result<bool> {
    let Some(path) = config.write_log.as_deref() else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .map_err(io::Error::other)?;

    tracing::info!(path, "logging initialised");
    Ok(true)
}
