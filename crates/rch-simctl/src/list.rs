//! `simctl list devices -j` parsing and device sources

use regex_lite::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tracing::debug;

use crate::device::{Device, SimPlatform};
use crate::{SimctlError, SimctlResult};

/// A provider of available simulated devices
pub trait DeviceSource {
    /// Available devices for one platform, in enumeration order
    fn devices(&self, platform: SimPlatform) -> SimctlResult<Vec<Device>>;
}

#[derive(Debug, Deserialize)]
struct SimctlDevice {
    name: String,
    udid: String,
    #[serde(default)]
    state: String,
    #[serde(rename = "isAvailable")]
    is_available: Option<bool>,
    /// Pre-Xcode 10.1 form: "(available)" / "(unavailable, ...)"
    availability: Option<String>,
}

impl SimctlDevice {
    fn available(&self) -> bool {
        match (self.is_available, self.availability.as_deref()) {
            (Some(flag), _) => flag,
            (None, Some(text)) => text.contains("(available)"),
            (None, None) => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SimctlDevices {
    devices: HashMap<String, Vec<SimctlDevice>>,
}

fn runtime_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(iOS|tvOS|watchOS)[ -](\d+)[.-](\d+)(?:[.-](\d+))?").unwrap()
    })
}

/// Parse a runtime key into platform and dotted OS version.
///
/// Accepts both identifier keys ("com.apple.CoreSimulator.SimRuntime.iOS-13-4")
/// and the older display keys ("iOS 13.4").
pub fn parse_runtime_key(key: &str) -> Option<(SimPlatform, String)> {
    let caps = runtime_regex().captures(key)?;
    let platform = SimPlatform::from_runtime_name(caps.get(1)?.as_str())?;

    let mut version = format!("{}.{}", caps.get(2)?.as_str(), caps.get(3)?.as_str());
    if let Some(patch) = caps.get(4) {
        version.push('.');
        version.push_str(patch.as_str());
    }

    Some((platform, version))
}

fn version_components(version: &str) -> Vec<u32> {
    version.split('.').filter_map(|s| s.parse().ok()).collect()
}

/// Parse `simctl list devices -j` output into available devices.
///
/// Runtimes are ordered by platform, then ascending OS version; devices keep
/// the order simctl lists them in within a runtime. Unavailable devices and
/// unrecognized runtimes are skipped.
pub fn parse_device_list(json: &[u8]) -> SimctlResult<Vec<Device>> {
    let parsed: SimctlDevices = serde_json::from_slice(json)
        .map_err(|e| SimctlError::ParseError(format!("failed to parse devices: {}", e)))?;

    let mut runtimes: Vec<(SimPlatform, String, String, Vec<SimctlDevice>)> = Vec::new();
    for (key, devices) in parsed.devices {
        match parse_runtime_key(&key) {
            Some((platform, version)) => runtimes.push((platform, version, key, devices)),
            None => debug!("skipping unrecognized simulator runtime {}", key),
        }
    }

    runtimes.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| version_components(&a.1).cmp(&version_components(&b.1)))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut result = Vec::new();
    for (platform, version, key, devices) in runtimes {
        for device in devices.into_iter().filter(|d| d.available()) {
            result.push(Device {
                name: device.name,
                os_version: version.clone(),
                udid: device.udid,
                platform,
                state: device.state,
                runtime: key.clone(),
            });
        }
    }

    Ok(result)
}

/// Device source backed by `xcrun simctl`
#[derive(Debug, Clone)]
pub struct Simctl {
    xcrun: PathBuf,
}

impl Default for Simctl {
    fn default() -> Self {
        Self {
            xcrun: PathBuf::from("xcrun"),
        }
    }
}

impl Simctl {
    pub fn new() -> Self {
        Self::default()
    }

    /// List every available device across platforms
    pub fn list_all(&self) -> SimctlResult<Vec<Device>> {
        let output = Command::new(&self.xcrun)
            .args(["simctl", "list", "devices", "-j"])
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SimctlError::SimctlFailed(format!(
                "simctl list failed: {}",
                stderr.trim()
            )));
        }

        parse_device_list(&output.stdout)
    }
}

impl DeviceSource for Simctl {
    fn devices(&self, platform: SimPlatform) -> SimctlResult<Vec<Device>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|d| d.platform == platform)
            .collect())
    }
}

/// Device source over a fixed list, e.g. a saved simctl listing
#[derive(Debug, Clone, Default)]
pub struct StaticDevices {
    devices: Vec<Device>,
}

impl StaticDevices {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// Load a saved `simctl list devices -j` output
    pub fn from_json_file(path: &Path) -> SimctlResult<Self> {
        let bytes = fs::read(path)?;
        Ok(Self::new(parse_device_list(&bytes)?))
    }

    pub fn all(&self) -> &[Device] {
        &self.devices
    }
}

impl DeviceSource for StaticDevices {
    fn devices(&self, platform: SimPlatform) -> SimctlResult<Vec<Device>> {
        Ok(self
            .devices
            .iter()
            .filter(|d| d.platform == platform)
            .cloned()
            .collect())
    }
}
