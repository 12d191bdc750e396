//! Shared fixtures for integration tests
//!
//! - A saved `xcrun simctl list devices -j` listing
//! - Preloaded project descriptors for each platform
//! - Scan configurations writing into a temp directory

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rch_scan::ScanConfig;
use rch_simctl::{Device, SimPlatform, StaticDevices};
use rch_xcproject::{ProjectKind, XcodeProject};

/// Path to the saved simctl listing
pub fn simctl_listing_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/simctl/devices.json")
}

/// Devices from the saved simctl listing
pub fn listed_devices() -> StaticDevices {
    StaticDevices::from_json_file(&simctl_listing_path()).expect("fixture listing parses")
}

/// The two-device list used by the selection scenarios
pub fn scenario_devices() -> Vec<Device> {
    vec![
        Device::new(SimPlatform::Ios, "iPhone 5s", "12.4", "OLD-001"),
        Device::new(SimPlatform::Ios, "iPhone 11", "13.4", "ABC-123"),
    ]
}

/// A project whose build settings and schemes are already known
pub fn project(dir: &Path, name: &str, settings: &[(&str, &str)], schemes: &[&str]) -> XcodeProject {
    XcodeProject::from_parts(
        dir.join(format!("{}.xcworkspace", name)),
        ProjectKind::Workspace,
        schemes.iter().map(|s| s.to_string()).collect(),
        settings
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    )
}

/// An iOS app project with the given deployment target
pub fn ios_project(dir: &Path, deployment_target: &str) -> XcodeProject {
    project(
        dir,
        "Shop",
        &[
            ("SDKROOT", "iphoneos"),
            ("IPHONEOS_DEPLOYMENT_TARGET", deployment_target),
            ("PRODUCT_NAME", "Shop"),
        ],
        &["Shop"],
    )
}

pub fn tvos_project(dir: &Path) -> XcodeProject {
    project(
        dir,
        "ShopTV",
        &[
            ("SDKROOT", "appletvos"),
            ("TVOS_DEPLOYMENT_TARGET", "13.0"),
            ("PRODUCT_NAME", "ShopTV"),
        ],
        &["ShopTV"],
    )
}

pub fn mac_project(dir: &Path) -> XcodeProject {
    project(
        dir,
        "ShopMac",
        &[("SDKROOT", "macosx"), ("PRODUCT_NAME", "ShopMac")],
        &["ShopMac"],
    )
}

/// Configuration with every output path under `root`
pub fn scan_config(root: &Path) -> ScanConfig {
    ScanConfig {
        buildlog_path: root.join("logs"),
        archive_path: root.join("archives"),
        output_directory: root.join("test_output"),
        ..Default::default()
    }
}
