// Copyright (c) 2025 - Cowboy AI, Inc.
//! Asset Value Object
//!
//! The resolved identity of one physical server: where its BMC lives, how to
//! authenticate against it, and (best-effort) who built it.
//!
//! # Invariants
//! - `id`, `bmc_address`, `bmc_username` and `bmc_password` are always populated
//! - `vendor`, `model` and `serial` may be empty when the inventory could not
//!   describe the hardware
//! - The BMC password never appears in `Debug` output

use std::fmt;
use std::net::IpAddr;

use thiserror::Error;
use uuid::Uuid;

/// Asset construction error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Asset {0} has no BMC address")]
    MissingBmcAddress(Uuid),

    #[error("Asset {0} has no BMC username")]
    MissingBmcUsername(Uuid),

    #[error("Asset {0} has no BMC password")]
    MissingBmcPassword(Uuid),
}

/// Attributes of a server retrieved from the inventory store.
///
/// Constructed fresh per lookup through [`AssetBuilder`]; nothing in this crate
/// mutates an asset once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Asset {
    id: Uuid,

    bmc_address: IpAddr,
    bmc_username: String,
    bmc_password: String,

    vendor: String,
    model: String,
    serial: String,

    facility_code: String,
}

impl Asset {
    /// Start building an asset for the given inventory identifier
    pub fn builder(id: Uuid) -> AssetBuilder {
        AssetBuilder::new(id)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bmc_address(&self) -> IpAddr {
        self.bmc_address
    }

    pub fn bmc_username(&self) -> &str {
        &self.bmc_username
    }

    pub fn bmc_password(&self) -> &str {
        &self.bmc_password
    }

    /// Canonical vendor name, empty when unknown
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Facility this asset is hosted in
    pub fn facility_code(&self) -> &str {
        &self.facility_code
    }

    /// True when vendor and model are both known
    pub fn has_hardware_identity(&self) -> bool {
        !self.vendor.is_empty() && !self.model.is_empty()
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("id", &self.id)
            .field("bmc_address", &self.bmc_address)
            .field("bmc_username", &self.bmc_username)
            .field("bmc_password", &"<redacted>")
            .field("vendor", &self.vendor)
            .field("model", &self.model)
            .field("serial", &self.serial)
            .field("facility_code", &self.facility_code)
            .finish()
    }
}

/// Builder for [`Asset`]
///
/// `build` refuses to produce an asset that is missing any of the fields a BMC
/// session needs.
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    id: Uuid,
    bmc_address: Option<IpAddr>,
    bmc_username: String,
    bmc_password: String,
    vendor: String,
    model: String,
    serial: String,
    facility_code: String,
}

impl AssetBuilder {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            bmc_address: None,
            bmc_username: String::new(),
            bmc_password: String::new(),
            vendor: String::new(),
            model: String::new(),
            serial: String::new(),
            facility_code: String::new(),
        }
    }

    pub fn bmc_address(mut self, address: IpAddr) -> Self {
        self.bmc_address = Some(address);
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.bmc_username = username.into();
        self.bmc_password = password.into();
        self
    }

    pub fn hardware(
        mut self,
        vendor: impl Into<String>,
        model: impl Into<String>,
        serial: impl Into<String>,
    ) -> Self {
        self.vendor = vendor.into();
        self.model = model.into();
        self.serial = serial.into();
        self
    }

    pub fn facility_code(mut self, facility_code: impl Into<String>) -> Self {
        self.facility_code = facility_code.into();
        self
    }

    pub fn build(self) -> Result<Asset, AssetError> {
        let bmc_address = self
            .bmc_address
            .ok_or(AssetError::MissingBmcAddress(self.id))?;

        if self.bmc_username.is_empty() {
            return Err(AssetError::MissingBmcUsername(self.id));
        }

        if self.bmc_password.is_empty() {
            return Err(AssetError::MissingBmcPassword(self.id));
        }

        Ok(Asset {
            id: self.id,
            bmc_address,
            bmc_username: self.bmc_username,
            bmc_password: self.bmc_password,
            vendor: self.vendor,
            model: self.model,
            serial: self.serial,
            facility_code: self.facility_code,
        })
    }
}
