//! Tracing bootstrap
//!
//! The library only emits `tracing` events; hosts opt into a subscriber
//! here or install their own.
//!
//! Configure via the RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=tinct::coordinator=debug` - module-level filtering

use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize a console subscriber filtered by RUST_LOG (default `warn`)
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_filter(console_filter),
        )
        .init();
}

/// Initialize console logging plus a daily-rolling debug log file
///
/// The file layer always logs at debug level for troubleshooting; the
/// console layer respects RUST_LOG.
pub fn init_with_file(logs_dir: impl AsRef<Path>) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(logs_dir, "tinct.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();
}
