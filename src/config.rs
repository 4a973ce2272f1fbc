// Copyright (c) 2025 - Cowboy AI, Inc.
//! Worker configuration loaded from the environment

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::bmc::SessionConfig;
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::logging::LogFormat;
use crate::nats::NatsConfig;

/// Inventory service connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Base URL, e.g. `http://serverservice:8000`
    pub endpoint: String,
    /// Bearer token
    pub token: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl fmt::Debug for InventoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Everything a worker process needs
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub nats: NatsConfig,
    /// Subject carrying power work items
    pub subject: String,
    /// Only accept work for this facility when set
    pub facility_code: Option<String>,
    pub inventory: InventoryConfig,
    pub session: SessionConfig,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl WorkerConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> InfrastructureResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> InfrastructureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let nats = NatsConfig {
            servers: var("NATS_URL", "nats://localhost:4222")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            name: "bmc-worker".to_string(),
            ..NatsConfig::default()
        };

        let inventory = InventoryConfig {
            endpoint: var("INVENTORY_URL", "http://localhost:8000"),
            token: lookup("INVENTORY_TOKEN")
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| {
                    InfrastructureError::Configuration("INVENTORY_TOKEN not set".to_string())
                })?,
            timeout_secs: parse_number(&lookup, "INVENTORY_TIMEOUT_SECS", 30)?,
        };

        let session = SessionConfig {
            login_attempts: parse_number(&lookup, "BMC_LOGIN_ATTEMPTS", 3)?,
            login_timeout: Duration::from_secs(parse_number(&lookup, "BMC_LOGIN_TIMEOUT_SECS", 180)?),
            logout_timeout: Duration::from_secs(parse_number(&lookup, "BMC_LOGOUT_TIMEOUT_SECS", 60)?),
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            nats,
            subject: var("BMC_WORKER_SUBJECT", "bmc.power.>"),
            facility_code: lookup("FACILITY_CODE")
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
            inventory,
            session,
            log_level: var("LOG_LEVEL", "info"),
            log_format,
        })
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> InfrastructureResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            InfrastructureError::Configuration(format!("{} must be a number: {}", key, e))
        }),
    }
}
