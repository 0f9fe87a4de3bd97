// src/logging.rs

//! Log subscriber setup.
//!
//! The filter comes from, in order:
//! 1. `--log-level`, applied to every target;
//! 2. `BUILDGATE_LOG`, read as an `EnvFilter` directive
//!    (`debug`, `buildgate::staleness=trace,info`, ...);
//! 3. `info`.
//!
//! Output goes to stderr; stdout is reserved for build output and results.

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "BUILDGATE_LOG";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(directive(level)),
        None => filter_from_env()?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

fn filter_from_env() -> Result<EnvFilter> {
    match std::env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => EnvFilter::try_new(value.trim())
            .with_context(|| format!("invalid {LOG_ENV} value {value:?}")),
        _ => Ok(EnvFilter::new("info")),
    }
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
