// Copyright (c) 2025 - Cowboy AI, Inc.
//! Structured logging setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter`. `RUST_LOG`
//! wins when set; otherwise the configured level applies to this crate.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::{InfrastructureError, InfrastructureResult};

/// Output encoding for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = InfrastructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(InfrastructureError::Configuration(format!(
                "unknown log format: {}",
                other
            ))),
        }
    }
}

/// Parse a worker log level; only `info`, `debug` and `trace` are accepted
pub fn parse_level(level: &str) -> InfrastructureResult<Level> {
    match level.trim().to_ascii_lowercase().as_str() {
        "" | "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        other => Err(InfrastructureError::Configuration(format!(
            "unsupported log level: {}",
            other
        ))),
    }
}

/// Install the global subscriber
pub fn init(level: &str, format: LogFormat) -> InfrastructureResult<()> {
    let level = parse_level(level)?;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cim_infrastructure_bmc={}", level)));

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
    };

    result.map_err(|e| InfrastructureError::Configuration(format!("logging init failed: {}", e)))
}
