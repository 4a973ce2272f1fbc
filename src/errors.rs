// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for worker operations

use thiserror::Error;

use crate::bmc::BmcError;
use crate::store::StoreError;

/// Errors that can occur while processing work items
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// Asset resolution failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// BMC session or query failed
    #[error(transparent)]
    Bmc(#[from] BmcError),

    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS subscribe error
    #[error("NATS subscribe error: {0}")]
    NatsSubscribe(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The work item is not meant for this worker
    #[error("Work item rejected: {0}")]
    WorkItemRejected(String),
}

impl InfrastructureError {
    /// Stable label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Store(e) => e.kind(),
            Self::Bmc(e) => e.kind(),
            Self::NatsConnection(_) => "nats_connection",
            Self::NatsSubscribe(_) => "nats_subscribe",
            Self::Serialization(_) => "serialization",
            Self::Deserialization(_) => "deserialization",
            Self::Configuration(_) => "configuration",
            Self::WorkItemRejected(_) => "rejected",
        }
    }
}

/// Result type for worker operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl From<async_nats::Error> for InfrastructureError {
    fn from(err: async_nats::Error) -> Self {
        InfrastructureError::NatsConnection(err.to_string())
    }
}

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}
