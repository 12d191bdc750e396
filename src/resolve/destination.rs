//! xcodebuild destination strings

use rch_simctl::Device;
use rch_xcproject::ProjectPlatform;
use tracing::warn;

use super::device::PlatformDefaults;
use super::ResolveError;
use crate::config::ScanConfig;

/// Destination used for desktop projects
pub const MAC_DESTINATION: &str = "platform=OS X";

/// Fill in `config.destination` unless the caller already set one.
///
/// A blank destination counts as unset.
///
/// Simulator platforms need the selected device; the desktop platform
/// ignores it.
pub fn compute_destination(
    config: &mut ScanConfig,
    platform: ProjectPlatform,
    device: Option<&Device>,
) -> Result<(), ResolveError> {
    if let Some(destination) = config.destination.as_deref().filter(|d| !d.trim().is_empty()) {
        warn!("It's not recommended to set the `destination` value directly");
        warn!("Instead use the other options available in `rch-scan test --help`");
        warn!("Using your value '{}' as given", destination);
        return Ok(());
    }

    let destination = match PlatformDefaults::for_project(platform) {
        Some(defaults) => {
            let device = device.ok_or(ResolveError::NoDeviceAvailable {
                platform: defaults.platform,
                deployment_target: String::new(),
            })?;
            format!("platform={},id={}", defaults.destination_platform, device.udid)
        }
        None => MAC_DESTINATION.to_string(),
    };

    config.destination = Some(destination);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rch_simctl::SimPlatform;

    #[test]
    fn test_ios_destination() {
        let mut config = ScanConfig::default();
        let device = Device::new(SimPlatform::Ios, "iPhone 11", "13.4", "ABC-123");

        compute_destination(&mut config, ProjectPlatform::Ios, Some(&device)).unwrap();
        assert_eq!(
            config.destination.as_deref(),
            Some("platform=iOS Simulator,id=ABC-123")
        );
    }

    #[test]
    fn test_tvos_destination() {
        let mut config = ScanConfig::default();
        let device = Device::new(SimPlatform::Tvos, "Apple TV 1080p", "13.4", "TV-1");

        compute_destination(&mut config, ProjectPlatform::Tvos, Some(&device)).unwrap();
        assert_eq!(
            config.destination.as_deref(),
            Some("platform=tvOS Simulator,id=TV-1")
        );
    }

    #[test]
    fn test_mac_destination_ignores_device() {
        let mut config = ScanConfig::default();
        compute_destination(&mut config, ProjectPlatform::Mac, None).unwrap();
        assert_eq!(config.destination.as_deref(), Some(MAC_DESTINATION));
    }

    #[test]
    fn test_caller_destination_kept() {
        let mut config = ScanConfig {
            destination: Some("platform=iOS,id=REAL-DEVICE".to_string()),
            ..Default::default()
        };
        let device = Device::new(SimPlatform::Ios, "iPhone 11", "13.4", "ABC-123");

        compute_destination(&mut config, ProjectPlatform::Ios, Some(&device)).unwrap();
        compute_destination(&mut config, ProjectPlatform::Ios, Some(&device)).unwrap();
        assert_eq!(
            config.destination.as_deref(),
            Some("platform=iOS,id=REAL-DEVICE")
        );
    }

    #[test]
    fn test_blank_caller_destination_is_computed() {
        let mut config = ScanConfig {
            destination: Some("  ".to_string()),
            ..Default::default()
        };
        let device = Device::new(SimPlatform::Ios, "iPhone 11", "13.4", "ABC-123");

        compute_destination(&mut config, ProjectPlatform::Ios, Some(&device)).unwrap();
        assert_eq!(
            config.destination.as_deref(),
            Some("platform=iOS Simulator,id=ABC-123")
        );
    }

    #[test]
    fn test_simulator_without_device_fails() {
        let mut config = ScanConfig::default();
        let result = compute_destination(&mut config, ProjectPlatform::Ios, None);
        assert!(result.is_err());
        assert!(config.destination.is_none());
    }
}
