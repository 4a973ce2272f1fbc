// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset Resolution
//!
//! Rebuilds a validated [`Asset`](crate::domain::Asset) from the three
//! independently queried record sets an inventory service holds for a server.
//!
//! ```text
//! asset id ──▶ GetCredential ─┐
//!          ──▶ GetServer ─────┼──▶ decode ──▶ Asset (+ warnings)
//!          ──▶ GetAttributes ─┘
//! ```
//!
//! Credentials, the server record and the BMC address are mandatory: any of
//! them failing aborts resolution. Vendor, model and serial are best-effort
//! and surface as warnings on the [`AssetResolution`].

pub mod attributes;
pub mod inventory;
pub mod repository;
#[cfg(feature = "serverservice")]
pub mod serverservice;

use std::fmt;

use thiserror::Error;

use crate::domain::AssetError;

pub use attributes::{
    decode, decode_bmc_address, decode_vendor_model, find_attribute, AttributeError,
    AttributeNamespace, DecodedAttribute, VendorIdentity, NS_BMC_ADDRESS, NS_VENDOR,
};
pub use inventory::{
    InventoryClient, InventoryError, ServerAttribute, ServerCredential, ServerRecord,
};
pub use repository::{AssetRepository, AssetResolution, InventoryRepository};
#[cfg(feature = "serverservice")]
pub use serverservice::ServerserviceClient;

/// Store layer result type
pub type StoreResult<T> = Result<T, StoreError>;

/// The three remote lookups issued per resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    GetCredential,
    GetServer,
    GetAttributes,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetCredential => "GetCredential",
            Self::GetServer => "GetServer",
            Self::GetAttributes => "GetAttributes",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset resolution errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Malformed asset identifier; no remote call was made
    #[error("Invalid asset identifier {id:?}: {reason}")]
    InvalidIdentifier { id: String, reason: String },

    /// An inventory lookup failed
    #[error("Inventory query {query} failed: {cause}")]
    InventoryQueryFailed { query: QueryKind, cause: InventoryError },

    /// No usable BMC address in the attribute set
    #[error("BMC address unresolved: {0}")]
    BmcAddressUnresolved(AttributeError),

    /// Vendor, model or serial could not be decoded (warning only)
    #[error("Device vendor, model attributes unresolved: {0}")]
    VendorModelUnresolved(AttributeError),

    /// Inventory returned records missing mandatory fields
    #[error("Asset incomplete: {0}")]
    Incomplete(#[from] AssetError),

    #[error("Asset resolution cancelled")]
    Cancelled,
}

impl StoreError {
    /// Stable label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "invalid_identifier",
            Self::InventoryQueryFailed { .. } => "inventory_query_failed",
            Self::BmcAddressUnresolved(_) => "bmc_address_unresolved",
            Self::VendorModelUnresolved(_) => "vendor_model_unresolved",
            Self::Incomplete(_) => "incomplete",
            Self::Cancelled => "cancelled",
        }
    }

    /// Fatal errors abort resolution; the rest are warnings
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::VendorModelUnresolved(_))
    }
}
