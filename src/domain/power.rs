// Copyright (c) 2025 - Cowboy AI, Inc.
//! Power state vocabulary shared by the BMC session and the worker

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unrecognised power state: {0:?}")]
pub struct UnknownPowerState(pub String);

/// Power state reported by a BMC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = UnknownPowerState;

    /// BMCs disagree on casing ("On", "on", "ON"); transitional Redfish
    /// states report the state being left.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on" | "poweringoff" => Ok(Self::On),
            "off" | "poweringon" => Ok(Self::Off),
            _ => Err(UnknownPowerState(s.to_string())),
        }
    }
}

/// Power change requested from a BMC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    /// Power on
    On,
    /// Hard power off
    Off,
    /// ACPI soft shutdown
    Soft,
    /// Power off then on
    Cycle,
    /// Warm reset
    Reset,
}

impl PowerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Soft => "soft",
            Self::Cycle => "cycle",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
