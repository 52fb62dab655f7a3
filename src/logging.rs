// ABOUTME: Logging configuration and structured logging setup for the embedding application
// ABOUTME: Builds a tracing-subscriber registry with env-filter and selectable output format
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Logging Setup
//!
//! The library instruments itself with `tracing` but never installs a
//! subscriber implicitly. Embedding applications call [`init_logging`]
//! once at startup; tests and hosts with their own subscriber skip it.

use std::env;

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Log output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging.
    Json,
    /// Pretty format for development.
    Pretty,
    /// Compact format for space-constrained environments.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive set (`RUST_LOG` syntax).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables:
    /// `RUST_LOG` for the filter, `NUTRILENS_LOG_FORMAT` for the format
    /// (`json`, `pretty`, or `compact`).
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        let format = match env::var("NUTRILENS_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };
        Self { level, format }
    }
}

/// Install the global tracing subscriber for this process.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env_format_selection() {
        std::env::set_var("NUTRILENS_LOG_FORMAT", "json");
        assert_eq!(LoggingConfig::from_env().format, LogFormat::Json);

        std::env::set_var("NUTRILENS_LOG_FORMAT", "compact");
        assert_eq!(LoggingConfig::from_env().format, LogFormat::Compact);

        std::env::set_var("NUTRILENS_LOG_FORMAT", "nonsense");
        assert_eq!(LoggingConfig::from_env().format, LogFormat::Pretty);

        std::env::remove_var("NUTRILENS_LOG_FORMAT");
    }
}
