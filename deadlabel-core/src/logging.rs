//! Structured logging built on **tracing**.
//!
//! Lint output goes to stdout; everything logged here goes to stderr so
//! `deadlabel --json` stays machine-readable. Library code logs through the
//! `tracing` macros directly; the helpers below are for the binaries.

use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Level for `deadlabel_core` when `RUST_LOG` is not set.
const DEFAULT_LEVEL: LevelFilter = LevelFilter::WARN;

/// Installs the global JSON subscriber writing to stderr.
///
/// A second call is ignored instead of panicking, so tests and embedders can
/// call it freely.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=deadlabel_core=debug`)
pub fn init_structured_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("deadlabel_core={}", DEFAULT_LEVEL.to_string().to_lowercase()))
    });
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs a file that could not be analyzed.
pub fn log_skipped(path: &str, reason: &str) {
    warn!(path = %path, reason = %reason, "file skipped");
}

fn event_level(event: &str) -> Level {
    match event.to_uppercase().as_str() {
        "ERROR" => Level::ERROR,
        "WARN" | "WARNING" => Level::WARN,
        _ => Level::INFO,
    }
}

/// Logs a named event, picking the level from the event name.
///
/// Only `ERROR` and `WARN` events pass the default filter.
pub fn log_event(event: &str, detail: &str) {
    match event_level(event) {
        Level::ERROR => error!(event = %event, detail = %detail),
        Level::WARN => warn!(event = %event, detail = %detail),
        _ => info!(event = %event, detail = %detail),
    }
}
