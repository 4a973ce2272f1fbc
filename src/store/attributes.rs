// Copyright (c) 2025 - Cowboy AI, Inc.
//! Attribute Decoder
//!
//! Turns namespaced attribute blobs into typed values. Each known namespace
//! has its own payload schema; [`decode`] dispatches on the namespace and
//! deserializes the payload into that schema, producing a
//! [`DecodedAttribute`] or an [`AttributeError`].
//!
//! Lookup is a linear scan and the first attribute with a matching namespace
//! is authoritative.

use std::net::IpAddr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{format_product_name, format_vendor_name};
use crate::store::inventory::ServerAttribute;

/// Namespace holding BMC network attributes
pub const NS_BMC_ADDRESS: &str = "sh.hollow.bmc_info";

/// Namespace holding vendor, model and serial
pub const NS_VENDOR: &str = "sh.hollow.alloy.server_vendor_attributes";

/// Attribute decoding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("BMC address attribute not found: {0}")]
    AddressNotFound(String),

    #[error("BMC address attribute invalid: {0}")]
    AddressInvalid(String),

    #[error("Vendor attributes not found: {0}")]
    VendorAttributesMissing(String),

    #[error("Device vendor unknown")]
    VendorUnknown,

    #[error("Device model unknown")]
    ModelUnknown,

    #[error("Attribute {namespace} malformed: {reason}")]
    Malformed { namespace: String, reason: String },
}

/// Attribute namespaces this crate understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeNamespace {
    BmcAddress,
    Vendor,
}

impl AttributeNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BmcAddress => NS_BMC_ADDRESS,
            Self::Vendor => NS_VENDOR,
        }
    }

    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            NS_BMC_ADDRESS => Some(Self::BmcAddress),
            NS_VENDOR => Some(Self::Vendor),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BmcAddressPayload {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
struct VendorPayload {
    #[serde(default)]
    vendor: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    serial: String,
}

/// Canonicalized manufacturer identity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorIdentity {
    pub vendor: String,
    pub model: String,
    pub serial: String,
}

/// Strongly typed result of decoding one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedAttribute {
    BmcAddress(IpAddr),
    Vendor(VendorIdentity),
}

/// First attribute in `attributes` carrying `namespace`
pub fn find_attribute<'a>(
    namespace: &str,
    attributes: &'a [ServerAttribute],
) -> Option<&'a ServerAttribute> {
    attributes.iter().find(|attr| attr.namespace == namespace)
}

/// Decode a single attribute according to its namespace
///
/// Returns `Ok(None)` for namespaces this crate does not interpret.
pub fn decode(attribute: &ServerAttribute) -> Result<Option<DecodedAttribute>, AttributeError> {
    let Some(namespace) = AttributeNamespace::from_namespace(&attribute.namespace) else {
        return Ok(None);
    };

    let decoded = match namespace {
        AttributeNamespace::BmcAddress => DecodedAttribute::BmcAddress(decode_address(attribute)?),
        AttributeNamespace::Vendor => DecodedAttribute::Vendor(decode_vendor(attribute)?),
    };

    Ok(Some(decoded))
}

/// BMC network address from an attribute set
pub fn decode_bmc_address(attributes: &[ServerAttribute]) -> Result<IpAddr, AttributeError> {
    let attribute = find_attribute(NS_BMC_ADDRESS, attributes)
        .ok_or_else(|| AttributeError::AddressNotFound(NS_BMC_ADDRESS.to_string()))?;

    decode_address(attribute)
}

/// Vendor, model and serial from an attribute set
pub fn decode_vendor_model(
    attributes: &[ServerAttribute],
) -> Result<VendorIdentity, AttributeError> {
    let attribute = find_attribute(NS_VENDOR, attributes)
        .ok_or_else(|| AttributeError::VendorAttributesMissing(NS_VENDOR.to_string()))?;

    decode_vendor(attribute)
}

fn decode_address(attribute: &ServerAttribute) -> Result<IpAddr, AttributeError> {
    let payload: BmcAddressPayload =
        payload(attribute).map_err(|e| AttributeError::AddressInvalid(e.to_string()))?;

    let address = payload.address.trim();
    if address.is_empty() {
        return Err(AttributeError::AddressInvalid(format!(
            "value undefined: {}",
            NS_BMC_ADDRESS
        )));
    }

    address
        .parse::<IpAddr>()
        .map_err(|_| AttributeError::AddressInvalid(format!("unparsable address: {}", address)))
}

fn decode_vendor(attribute: &ServerAttribute) -> Result<VendorIdentity, AttributeError> {
    let payload: VendorPayload =
        payload(attribute).map_err(|e| AttributeError::Malformed {
            namespace: attribute.namespace.clone(),
            reason: e.to_string(),
        })?;

    let identity = VendorIdentity {
        vendor: format_vendor_name(&payload.vendor),
        model: format_product_name(&payload.model),
        serial: payload.serial.trim().to_string(),
    };

    if identity.vendor.is_empty() {
        return Err(AttributeError::VendorUnknown);
    }

    if identity.model.is_empty() {
        return Err(AttributeError::ModelUnknown);
    }

    Ok(identity)
}

/// Payloads occasionally arrive double-encoded as a JSON string
fn payload<T: DeserializeOwned>(attribute: &ServerAttribute) -> Result<T, serde_json::Error> {
    match &attribute.data {
        serde_json::Value::String(raw) => serde_json::from_str(raw),
        value => T::deserialize(value),
    }
}
