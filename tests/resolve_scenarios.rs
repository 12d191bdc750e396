//! Device and destination resolution scenarios
//!
//! Exercises selection against hand-built device lists and the saved simctl
//! listing, then checks the destination and command the resolution feeds.

mod fixtures;

use rch_scan::command::{OutputEnv, RunCache, TestCommandGenerator};
use rch_scan::resolve::{
    compute_destination, resolve_defaults, select_device, MajorMinor, ResolveError, IOS, TVOS,
};
use rch_scan::{OutputStyle, ScanConfig};
use rch_simctl::{Device, DeviceSource, SimPlatform, StaticDevices};
use rch_xcproject::ProjectPlatform;
use tempfile::TempDir;

// === Selection scenarios ===

#[test]
fn test_target_filters_out_older_default() {
    let device = select_device(&fixtures::scenario_devices(), &ScanConfig::default(), "13.0", &IOS)
        .unwrap();
    assert_eq!(device.name, "iPhone 11");
}

#[test]
fn test_empty_target_prefers_default() {
    let device =
        select_device(&fixtures::scenario_devices(), &ScanConfig::default(), "", &IOS).unwrap();
    assert_eq!(device.name, "iPhone 5s");
}

#[test]
fn test_clean_run_destination_and_actions() {
    let temp = TempDir::new().unwrap();
    let mut config = ScanConfig {
        clean: true,
        scheme: Some("Shop".to_string()),
        ..fixtures::scan_config(temp.path())
    };
    let device = Device::new(SimPlatform::Ios, "iPhone 11", "13.4", "ABC-123");

    compute_destination(&mut config, ProjectPlatform::Ios, Some(&device)).unwrap();
    assert_eq!(
        config.destination.as_deref(),
        Some("platform=iOS Simulator,id=ABC-123")
    );

    let project = fixtures::ios_project(temp.path(), "13.0");
    let generator = TestCommandGenerator::new(&config, &project, OutputEnv::default());
    assert_eq!(generator.actions(), vec!["clean", "test"]);

    let tokens = generator.generate(&mut RunCache::default()).unwrap();
    let clean = tokens.iter().position(|t| t == "clean").unwrap();
    let test = tokens.iter().position(|t| t == "test").unwrap();
    assert_eq!(test, clean + 1);
}

#[test]
fn test_rspec_style_only_adds_test_flag() {
    let temp = TempDir::new().unwrap();
    let config = ScanConfig {
        output_style: Some(OutputStyle::Rspec),
        scheme: Some("Shop".to_string()),
        ..fixtures::scan_config(temp.path())
    };
    let project = fixtures::ios_project(temp.path(), "13.0");
    let env = OutputEnv {
        ci: false,
        colors_disabled: false,
    };

    let generator = TestCommandGenerator::new(&config, &project, env);
    assert_eq!(generator.formatter_flags(), vec!["--test"]);
}

// === Selection properties ===

#[test]
fn test_never_selects_below_target() {
    let devices = fixtures::listed_devices().devices(SimPlatform::Ios).unwrap();

    for target in ["9.0", "12.0", "12.4", "13.0", "13.4"] {
        let device = select_device(&devices, &ScanConfig::default(), target, &IOS).unwrap();
        assert!(
            MajorMinor::parse(&device.os_version) >= MajorMinor::parse(target),
            "{} selected for target {}",
            device.display_name(),
            target
        );
    }
}

#[test]
fn test_hint_wins_over_target() {
    let config = ScanConfig {
        device: Some("iPhone 5s (12.4)".to_string()),
        ..Default::default()
    };
    let device = select_device(&fixtures::scenario_devices(), &config, "13.0", &IOS).unwrap();
    assert_eq!(device.udid, "OLD-001");
}

#[test]
fn test_unmatched_hint_falls_back() {
    let config = ScanConfig {
        device: Some("iPhone 42".to_string()),
        ..Default::default()
    };
    let device = select_device(&fixtures::scenario_devices(), &config, "13.0", &IOS).unwrap();
    assert_eq!(device.udid, "ABC-123");
}

#[test]
fn test_blank_hint_takes_first_device() {
    let config = ScanConfig {
        device: Some("  ".to_string()),
        ..Default::default()
    };
    // below the 13.0 target, yet a hint match skips version filtering
    let device = select_device(&fixtures::scenario_devices(), &config, "13.0", &IOS).unwrap();
    assert_eq!(device.udid, "OLD-001");
}

#[test]
fn test_target_above_every_device_fails() {
    let result = select_device(&fixtures::scenario_devices(), &ScanConfig::default(), "14.0", &IOS);
    assert!(matches!(result, Err(ResolveError::NoDeviceAvailable { .. })));
}

#[test]
fn test_destination_is_idempotent() {
    let mut config = ScanConfig::default();
    let device = Device::new(SimPlatform::Ios, "iPhone 11", "13.4", "ABC-123");

    compute_destination(&mut config, ProjectPlatform::Ios, Some(&device)).unwrap();
    let first = config.destination.clone();

    let other = Device::new(SimPlatform::Ios, "iPhone 8", "13.4", "XYZ-999");
    compute_destination(&mut config, ProjectPlatform::Ios, Some(&other)).unwrap();
    assert_eq!(config.destination, first);
}

// === Full resolution against the saved listing ===

#[test]
fn test_listing_skips_unavailable_devices() {
    let source = fixtures::listed_devices();
    let ios = source.devices(SimPlatform::Ios).unwrap();

    assert!(ios.iter().all(|d| d.name != "iPhone SE"));
    assert_eq!(ios[0].name, "iPhone 5s");
    assert_eq!(ios[0].os_version, "12.4");
}

#[test]
fn test_resolve_ios_from_listing() {
    let temp = TempDir::new().unwrap();
    let mut config = fixtures::scan_config(temp.path());
    let mut project = fixtures::ios_project(temp.path(), "13.0");

    let device = resolve_defaults(&mut config, &mut project, &fixtures::listed_devices())
        .unwrap()
        .unwrap();

    assert_eq!(device.udid, "ABC-123");
    assert_eq!(config.device.as_deref(), Some("iPhone 11 (13.4)"));
    assert_eq!(
        config.destination.as_deref(),
        Some("platform=iOS Simulator,id=ABC-123")
    );
}

#[test]
fn test_resolve_tvos_from_listing() {
    let temp = TempDir::new().unwrap();
    let mut config = fixtures::scan_config(temp.path());
    let mut project = fixtures::tvos_project(temp.path());

    let device = resolve_defaults(&mut config, &mut project, &fixtures::listed_devices())
        .unwrap()
        .unwrap();

    assert_eq!(device.name, TVOS.default_device);
    assert_eq!(
        config.destination.as_deref(),
        Some("platform=tvOS Simulator,id=TV-HD")
    );
}

#[test]
fn test_resolve_mac_needs_no_simulator() {
    let temp = TempDir::new().unwrap();
    let mut config = fixtures::scan_config(temp.path());
    let mut project = fixtures::mac_project(temp.path());

    let device =
        resolve_defaults(&mut config, &mut project, &StaticDevices::default()).unwrap();

    assert!(device.is_none());
    assert_eq!(config.destination.as_deref(), Some("platform=OS X"));
}

#[test]
fn test_resolve_with_caller_destination_still_selects_device() {
    let temp = TempDir::new().unwrap();
    let mut config = ScanConfig {
        destination: Some("platform=iOS,name=Team iPhone".to_string()),
        ..fixtures::scan_config(temp.path())
    };
    let mut project = fixtures::ios_project(temp.path(), "");

    let device = resolve_defaults(&mut config, &mut project, &fixtures::listed_devices())
        .unwrap()
        .unwrap();

    assert_eq!(device.name, "iPhone 5s");
    assert_eq!(
        config.destination.as_deref(),
        Some("platform=iOS,name=Team iPhone")
    );
}

#[test]
fn test_resolve_unknown_scheme() {
    let temp = TempDir::new().unwrap();
    let mut config = ScanConfig {
        scheme: Some("Missing".to_string()),
        ..fixtures::scan_config(temp.path())
    };
    let mut project = fixtures::ios_project(temp.path(), "13.0");

    let result = resolve_defaults(&mut config, &mut project, &fixtures::listed_devices());
    assert!(matches!(result, Err(ResolveError::SchemeNotFound { .. })));
}

#[test]
fn test_empty_destination_is_resolved_into_command() {
    let temp = TempDir::new().unwrap();
    let mut config = ScanConfig {
        scheme: Some("Shop".to_string()),
        destination: Some(String::new()),
        ..fixtures::scan_config(temp.path())
    };
    let mut project = fixtures::ios_project(temp.path(), "13.0");

    resolve_defaults(&mut config, &mut project, &fixtures::listed_devices()).unwrap();
    assert_eq!(
        config.destination.as_deref(),
        Some("platform=iOS Simulator,id=ABC-123")
    );

    let generator = TestCommandGenerator::new(&config, &project, OutputEnv::default());
    let tokens = generator.generate(&mut RunCache::default()).unwrap();
    assert!(tokens.contains(&"-destination 'platform=iOS Simulator,id=ABC-123'".to_string()));
}
