//! Logging configuration for hookscope
//!
//! Compact terminal output plus optional file logging using tracing.

use crate::Result;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown by default
const TARGETS: [&str; 4] = [
    "hookscope",
    "hookscope_engine",
    "hookscope_config",
    "hookscope_core",
];

/// Build the default filter directive for the given level
fn default_directive(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn filter_error(e: impl std::fmt::Display) -> hookscope_core::Error {
    hookscope_core::Error::Message(format!("Invalid log filter: {e}"))
}

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging (timestamps included)
/// * `log_file` - Optional path to append pretty-printed debug logs to
///
/// `RUST_LOG` overrides the terminal filter.
///
/// # Examples
/// ```ignore
/// // Basic usage with info level
/// init(false, None)?;
///
/// // Verbose mode with a debug log file
/// init(true, Some(Path::new("hookscope.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(level)).map_err(filter_error)?,
    };

    // Timestamps only matter when following a long scan in verbose mode
    let stdout_layer = if verbose {
        fmt::layer()
            .with_target(false)
            .with_thread_names(true)
            .compact()
            .with_ansi(true)
            .with_filter(env_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .without_time()
            .compact()
            .with_ansi(true)
            .with_filter(env_filter)
            .boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(
                        EnvFilter::try_new(default_directive("debug")).map_err(filter_error)?,
                    ),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| hookscope_core::Error::Message(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}
