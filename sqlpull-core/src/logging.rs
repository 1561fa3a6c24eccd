//! Logging setup for hosts embedding sqlpull.
//!
//! The library itself only emits `tracing` events under the `sqlpull_core`
//! target. Hosts without a subscriber of their own can install this one;
//! `SQLPULL_LOG` (an `EnvFilter` directive string) overrides the verbosity
//! flags.

use crate::Result;
use crate::error::SqlPullError;
use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives, e.g. `sqlpull_core=trace`.
pub const LOG_ENV_VAR: &str = "SQLPULL_LOG";

/// Maps verbosity flags to a maximum log level.
///
/// `quiet` wins over any verbosity; 0 is INFO, 1 is DEBUG, 2+ is TRACE.
pub const fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Builds the event filter: `SQLPULL_LOG` when set and valid, otherwise
/// this crate's events at [`level_for`] and everything else at WARN.
pub fn filter_for(verbose: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| default_filter(verbose, quiet))
}

fn default_filter(verbose: u8, quiet: bool) -> EnvFilter {
    let level = level_for(verbose, quiet).as_str().to_ascii_lowercase();
    let global = if quiet { "error" } else { "warn" };
    EnvFilter::new(format!("{},sqlpull_core={}", global, level))
}

/// Installs a global fmt subscriber filtered by [`filter_for`].
///
/// # Errors
/// Returns a configuration error if a global subscriber is already set.
///
/// # Example
/// ```rust,no_run
/// use sqlpull_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbose, quiet))
        .with_target(true)
        .try_init()
        .map_err(|e| SqlPullError::configuration(format!("Failed to initialize logging: {}", e)))
}
