//! Device and destination resolution
//!
//! Fills in the parts of a [`ScanConfig`] the user left out: which scheme to
//! test, which simulator to run on and the xcodebuild destination for it.

mod destination;
mod device;
mod version;

pub use destination::{compute_destination, MAC_DESTINATION};
pub use device::{normalize_hint, select_device, PlatformDefaults, IOS, TVOS};
pub use version::MajorMinor;

use rch_simctl::{Device, DeviceSource, SimPlatform, SimctlError};
use rch_xcproject::{detect_project as find_project, ProjectError, ProjectInfo, XcodeProject};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ScanConfig;

/// Errors during resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Nothing to test was found
    #[error("could not detect a project: {0}")]
    NoProject(String),

    #[error("no {platform} simulators found matching deployment target '{deployment_target}'")]
    NoDeviceAvailable {
        platform: SimPlatform,
        deployment_target: String,
    },

    #[error("couldn't find any schemes in {0}")]
    NoSchemes(PathBuf),

    #[error("couldn't find scheme '{scheme}'; available: {available}")]
    SchemeNotFound { scheme: String, available: String },

    #[error("multiple schemes found ({available}); pass one with --scheme")]
    AmbiguousScheme { available: String },

    #[error("project error: {0}")]
    Project(#[from] ProjectError),

    #[error("simulator listing failed: {0}")]
    Devices(#[from] SimctlError),
}

/// Locate the workspace or project for this run
pub fn detect_project(config: &ScanConfig, dir: &Path) -> Result<XcodeProject, ResolveError> {
    find_project(dir, config.workspace.as_deref(), config.project.as_deref()).map_err(|e| {
        match e {
            ProjectError::NotFound(_) | ProjectError::Ambiguous { .. } => {
                ResolveError::NoProject(e.to_string())
            }
            other => ResolveError::Project(other),
        }
    })
}

/// Choose the scheme to test
pub fn select_scheme(
    available: &[String],
    requested: Option<&str>,
    project_path: &Path,
) -> Result<String, ResolveError> {
    if let Some(scheme) = requested {
        if available.is_empty() || available.iter().any(|s| s == scheme) {
            return Ok(scheme.to_string());
        }
        return Err(ResolveError::SchemeNotFound {
            scheme: scheme.to_string(),
            available: available.join(", "),
        });
    }

    match available {
        [] => Err(ResolveError::NoSchemes(project_path.to_path_buf())),
        [only] => Ok(only.clone()),
        _ => Err(ResolveError::AmbiguousScheme {
            available: available.join(", "),
        }),
    }
}

/// Resolve scheme, device and destination into `config`.
///
/// Runs after the project has been detected. On simulator platforms the
/// selected device is returned and recorded in `config.device`; desktop
/// projects return None.
pub fn resolve_defaults(
    config: &mut ScanConfig,
    project: &mut dyn ProjectInfo,
    devices: &dyn DeviceSource,
) -> Result<Option<Device>, ResolveError> {
    let available = if config.scheme.is_some() {
        project.schemes().unwrap_or_default()
    } else {
        project.schemes()?
    };
    let scheme = select_scheme(&available, config.scheme.as_deref(), project.path())?;
    project.set_scheme(&scheme);
    config.scheme = Some(scheme);
    project.ensure_build_settings()?;

    let platform = project.platform();
    debug!("project platform: {:?}", platform);

    let device = match PlatformDefaults::for_project(platform) {
        Some(defaults) => {
            let listed = devices.devices(defaults.platform)?;
            let target = project.build_setting(defaults.deployment_target_key);
            let device = select_device(&listed, config, &target, defaults)?;
            info!("Using {} simulator {}", defaults.platform, device.display_name());
            config.device = Some(device.display_name());
            Some(device)
        }
        None => None,
    };

    compute_destination(config, platform, device.as_ref())?;
    Ok(device)
}
