//! Simulator selection

use rch_simctl::{Device, SimPlatform};
use rch_xcproject::ProjectPlatform;
use tracing::{debug, warn};

use super::version::MajorMinor;
use super::ResolveError;
use crate::config::ScanConfig;

/// Per-platform selection parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDefaults {
    /// Simulator platform devices are enumerated for
    pub platform: SimPlatform,

    /// Build setting holding the minimum OS version
    pub deployment_target_key: &'static str,

    /// Device preferred when no hint is given
    pub default_device: &'static str,

    /// `platform=` value of the xcodebuild destination
    pub destination_platform: &'static str,
}

/// iPhone 5s is small and reasonably fast for tests
pub const IOS: PlatformDefaults = PlatformDefaults {
    platform: SimPlatform::Ios,
    deployment_target_key: "IPHONEOS_DEPLOYMENT_TARGET",
    default_device: "iPhone 5s",
    destination_platform: "iOS Simulator",
};

pub const TVOS: PlatformDefaults = PlatformDefaults {
    platform: SimPlatform::Tvos,
    deployment_target_key: "TVOS_DEPLOYMENT_TARGET",
    default_device: "Apple TV 1080p",
    destination_platform: "tvOS Simulator",
};

impl PlatformDefaults {
    /// Selection parameters for a simulator platform; None for the desktop
    pub fn for_project(platform: ProjectPlatform) -> Option<&'static PlatformDefaults> {
        match platform {
            ProjectPlatform::Ios => Some(&IOS),
            ProjectPlatform::Tvos => Some(&TVOS),
            ProjectPlatform::Mac => None,
        }
    }
}

/// Normalize a user device hint: trim and drop parentheses.
///
/// "iPhone 6 (9.0)" becomes "iPhone 6 9.0", matching [`Device::search_key`].
pub fn normalize_hint(hint: &str) -> String {
    hint.trim().replace(|c: char| c == '(' || c == ')', "")
}

/// Pick the device to test on.
///
/// A `device` hint matching `"<name> <os_version>"` wins outright, with no
/// version filtering. Otherwise devices older than `deployment_target`
/// (major.minor) are dropped, and the platform default is preferred over the
/// first remaining device.
pub fn select_device(
    devices: &[Device],
    config: &ScanConfig,
    deployment_target: &str,
    defaults: &PlatformDefaults,
) -> Result<Device, ResolveError> {
    if let Some(ref raw) = config.device {
        // An empty hint is a substring of every key and picks the first device
        let hint = normalize_hint(raw);
        if let Some(found) = devices.iter().find(|d| d.search_key().contains(&hint)) {
            debug!("device hint '{}' matched {}", raw, found.display_name());
            return Ok(found.clone());
        }
        warn!(
            "Couldn't find simulator '{}' - falling back to default simulator",
            raw
        );
    }

    let candidates: Vec<&Device> = if deployment_target.trim().is_empty() {
        devices.iter().collect()
    } else {
        let target = MajorMinor::parse(deployment_target);
        devices
            .iter()
            .filter(|d| MajorMinor::parse(&d.os_version).satisfies(&target))
            .collect()
    };

    candidates
        .iter()
        .find(|d| d.name == defaults.default_device)
        .or_else(|| candidates.first())
        .map(|d| (*d).clone())
        .ok_or(ResolveError::NoDeviceAvailable {
            platform: defaults.platform,
            deployment_target: deployment_target.to_string(),
        })
}
