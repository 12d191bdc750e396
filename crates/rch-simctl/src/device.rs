//! Device records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SimctlError;

/// Simulator platform family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimPlatform {
    Ios,
    Tvos,
    Watchos,
}

impl SimPlatform {
    /// Platform name as it appears in runtime identifiers (e.g., "iOS")
    pub fn runtime_name(&self) -> &'static str {
        match self {
            SimPlatform::Ios => "iOS",
            SimPlatform::Tvos => "tvOS",
            SimPlatform::Watchos => "watchOS",
        }
    }

    /// Match a runtime platform name, ignoring case
    pub fn from_runtime_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ios" => Some(SimPlatform::Ios),
            "tvos" => Some(SimPlatform::Tvos),
            "watchos" => Some(SimPlatform::Watchos),
            _ => None,
        }
    }
}

impl fmt::Display for SimPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.runtime_name())
    }
}

impl FromStr for SimPlatform {
    type Err = SimctlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_runtime_name(s).ok_or_else(|| SimctlError::UnknownPlatform(s.to_string()))
    }
}

/// One available simulated device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Device name (e.g., "iPhone 11")
    pub name: String,

    /// Runtime OS version, dot-separated (e.g., "13.4")
    pub os_version: String,

    /// Device UDID
    pub udid: String,

    /// Platform of the device's runtime
    pub platform: SimPlatform,

    /// Device state (e.g., "Shutdown", "Booted")
    #[serde(default)]
    pub state: String,

    /// Runtime key the device was listed under
    #[serde(default)]
    pub runtime: String,
}

impl Device {
    /// Create a shut-down device record without a runtime key
    pub fn new(
        platform: SimPlatform,
        name: impl Into<String>,
        os_version: impl Into<String>,
        udid: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            os_version: os_version.into(),
            udid: udid.into(),
            platform,
            state: "Shutdown".to_string(),
            runtime: String::new(),
        }
    }

    /// Text a device hint is matched against: `"<name> <os_version>"`
    pub fn search_key(&self) -> String {
        format!("{} {}", self.name, self.os_version)
    }

    /// Human-readable label, e.g. "iPhone 11 (13.4)"
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.os_version)
    }
}
