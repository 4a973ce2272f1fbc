// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hardware Vendor Taxonomy
//!
//! Inventory systems record manufacturer and product names exactly as the
//! firmware reports them ("Dell Inc.", "HPE", "Supermicro", "To Be Filled By
//! O.E.M."). This module maps those raw strings onto a canonical vocabulary so
//! downstream hardware-specific logic can match on a stable name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder strings SMBIOS tables carry when the OEM never filled a field
const SMBIOS_PLACEHOLDERS: &[&str] = &[
    "to be filled by o.e.m.",
    "default string",
    "system manufacturer",
    "system product name",
    "not specified",
    "n/a",
];

/// Canonical server hardware vendor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    Dell,
    Hpe,
    Supermicro,
    Lenovo,
    Quanta,
    Gigabyte,
    Intel,
    AsrockRack,
    Packet,
    /// Vendor not in the taxonomy, kept verbatim (trimmed)
    Other(String),
}

impl Vendor {
    /// Classify a raw manufacturer string
    ///
    /// Returns `None` for empty input and SMBIOS placeholders.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let cleaned = clean(raw)?;
        let lower = cleaned.to_lowercase();

        let vendor = if lower.contains("dell") {
            Self::Dell
        } else if lower.contains("hewlett") || lower == "hpe" || lower == "hp" {
            Self::Hpe
        } else if lower.contains("supermicro") || lower.contains("super micro") {
            Self::Supermicro
        } else if lower.contains("lenovo") {
            Self::Lenovo
        } else if lower.contains("quanta") {
            Self::Quanta
        } else if lower.contains("gigabyte") || lower.contains("giga-byte") {
            Self::Gigabyte
        } else if lower.contains("asrock") {
            Self::AsrockRack
        } else if lower.starts_with("intel") {
            Self::Intel
        } else if lower.contains("packet") || lower.contains("equinix") {
            Self::Packet
        } else {
            Self::Other(cleaned)
        };

        Some(vendor)
    }

    /// Canonical display name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dell => "Dell",
            Self::Hpe => "HPE",
            Self::Supermicro => "Supermicro",
            Self::Lenovo => "Lenovo",
            Self::Quanta => "Quanta",
            Self::Gigabyte => "Gigabyte",
            Self::Intel => "Intel",
            Self::AsrockRack => "ASRockRack",
            Self::Packet => "Packet",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical vendor name for a raw manufacturer string, empty if unknown
pub fn format_vendor_name(raw: &str) -> String {
    Vendor::from_raw(raw)
        .map(|vendor| vendor.as_str().to_string())
        .unwrap_or_default()
}

/// Normalized product name: trimmed, single-spaced, placeholders dropped
pub fn format_product_name(raw: &str) -> String {
    clean(raw).unwrap_or_default()
}

fn clean(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() || SMBIOS_PLACEHOLDERS.contains(&collapsed.to_lowercase().as_str()) {
        return None;
    }

    Some(collapsed)
}
