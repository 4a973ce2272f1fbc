// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory service records and client interface
//!
//! The inventory service answers three idempotent reads per server: its BMC
//! credential, its server record and its attribute set. Any backend that can
//! answer those implements [`InventoryClient`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by an inventory backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Inventory transport error: {0}")]
    Transport(String),

    #[error("Inventory response could not be decoded: {0}")]
    Decode(String),
}

/// BMC credential stored for a server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCredential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ServerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server record as held by the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub uuid: Uuid,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "facility", default)]
    pub facility_code: String,
}

/// One namespaced, loosely-typed attribute blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerAttribute {
    pub namespace: String,

    #[serde(default)]
    pub data: serde_json::Value,
}

impl ServerAttribute {
    pub fn new(namespace: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            namespace: namespace.into(),
            data,
        }
    }
}

/// Read-only access to the inventory service
///
/// Implementations are stateless after construction and may be shared across
/// concurrent resolutions.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Store kind label used in metrics (e.g. "serverservice")
    fn kind(&self) -> &'static str;

    async fn get_credential(&self, id: Uuid) -> Result<ServerCredential, InventoryError>;

    async fn get_server(&self, id: Uuid) -> Result<ServerRecord, InventoryError>;

    async fn get_attributes(&self, id: Uuid) -> Result<Vec<ServerAttribute>, InventoryError>;
}
