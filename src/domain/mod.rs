// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bare-Metal Domain Models
//!
//! Value objects describing the servers this crate controls.
//!
//! - [`Asset`] - Resolved server identity with BMC reachability and credentials
//! - [`Vendor`] - Canonical hardware vendor taxonomy
//! - [`PowerState`] / [`PowerAction`] - Power vocabulary spoken to BMCs

pub mod asset;
pub mod power;
pub mod vendor;

pub use asset::{Asset, AssetBuilder, AssetError};
pub use power::{PowerAction, PowerState, UnknownPowerState};
pub use vendor::{format_product_name, format_vendor_name, Vendor};
