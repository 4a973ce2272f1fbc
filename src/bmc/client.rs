// Copyright (c) 2025 - Cowboy AI, Inc.
//! BMC control library interface
//!
//! The wire protocol (Redfish, IPMI, vendor APIs) lives behind [`BmcClient`];
//! this crate only drives its session lifecycle. A [`BmcConnector`] hands out
//! one fresh client per login.

use std::fmt;
use std::net::IpAddr;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Asset, PowerAction};

/// Errors reported by a BMC control library
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Credentials were rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The session could not be established or was lost
    #[error("session error: {0}")]
    Session(String),

    /// A request on an established session failed
    #[error("request failed: {0}")]
    Request(String),
}

impl ClientError {
    /// Stable label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Session(_) => "session",
            Self::Request(_) => "request",
        }
    }
}

/// Where and how to reach a BMC
#[derive(Clone, PartialEq, Eq)]
pub struct BmcEndpoint {
    pub address: IpAddr,
    pub username: String,
    pub password: String,
}

impl From<&Asset> for BmcEndpoint {
    fn from(asset: &Asset) -> Self {
        Self {
            address: asset.bmc_address(),
            username: asset.bmc_username().to_string(),
            password: asset.bmc_password().to_string(),
        }
    }
}

impl fmt::Debug for BmcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BmcEndpoint")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A connection handle to one management controller
///
/// Every call is network I/O and may be slow or hang; callers bound them
/// with timeouts.
#[async_trait]
pub trait BmcClient: Send {
    /// Establish an authenticated session
    async fn login(&mut self) -> Result<(), ClientError>;

    /// Tear the session down
    async fn logout(&mut self) -> Result<(), ClientError>;

    /// Current power state as the BMC spells it (e.g. "On", "off")
    async fn get_power_state(&mut self) -> Result<String, ClientError>;

    /// Request a power change; `Ok(false)` means the BMC refused the request
    async fn set_power_state(&mut self, action: PowerAction) -> Result<bool, ClientError>;
}

/// Factory producing connection handles for an endpoint
pub trait BmcConnector: Send + Sync {
    type Client: BmcClient + 'static;

    fn connect(&self, endpoint: &BmcEndpoint) -> Self::Client;
}
