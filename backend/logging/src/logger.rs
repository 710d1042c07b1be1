//! Structured Logger
//!
//! Wraps `tracing` to provide console output plus a daily-rotated JSON
//! (NDJSON) file, with environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix of the rolling log, e.g. `wakit.log.2026-10-18`.
pub const LOG_FILE_PREFIX: &str = "wakit.log";

/// Initialize the global structured logger.
///
/// `RUST_LOG` takes precedence over `level`. Returns `false` if a global
/// subscriber was already installed.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
}
