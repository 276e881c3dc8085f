// src/utils/logging.rs
//! Logging utilities for the agent.
//!
//! This module provides functions for initializing and configuring
//! the logging system.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with console output and an optional file mirror.
///
/// Returns the file writer guard when a log file is configured. The caller
/// must keep the guard alive for the lifetime of the process so buffered
/// log lines are flushed on exit.
pub fn init_logging(log_level: &str, log_file: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::new(log_level), // Use provided level as fallback
    };

    let console_layer = fmt::layer().with_target(true).with_writer(io::stdout);

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer);

    match log_file {
        Some(path) => {
            let log_dir = path.parent().unwrap_or_else(|| Path::new("."));
            let log_name = path
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| std::ffi::OsString::from("hostwarden.log"));

            let file_appender = tracing_appender::rolling::never(log_dir, log_name);
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = fmt::layer()
                .with_target(true)
                .with_writer(non_blocking_writer)
                .with_ansi(false); // Disable ANSI colors for file logs

            registry
                .with(file_layer)
                .try_init()
                .map_err(|e| init_error(&e.to_string()))?;

            Ok(Some(guard))
        }
        None => {
            registry.try_init().map_err(|e| init_error(&e.to_string()))?;
            Ok(None)
        }
    }
}

fn init_error(message: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("Failed to initialize logging: {message}"),
    )
}
