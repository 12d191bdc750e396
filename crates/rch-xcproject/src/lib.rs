//! Xcode project discovery for rch-scan
//!
//! Finds the `.xcworkspace` or `.xcodeproj` to test, lists its schemes and
//! answers build-setting lookups by asking `xcodebuild`. Consumers depend on
//! the [`ProjectInfo`] trait rather than on [`XcodeProject`] directly.

mod detect;
mod project;
mod schemes;
mod settings;

pub use detect::detect_project;
pub use project::XcodeProject;
pub use schemes::parse_scheme_list;
pub use settings::parse_build_settings;

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from project discovery
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no Xcode workspace or project found in {0}")]
    NotFound(PathBuf),

    #[error("multiple {kind} files found in {dir}: {candidates}; pass one explicitly")]
    Ambiguous {
        kind: String,
        dir: PathBuf,
        candidates: String,
    },

    #[error("xcodebuild failed: {0}")]
    XcodebuildFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Whether the container is a workspace or a bare project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Workspace,
    Project,
}

impl ProjectKind {
    /// The xcodebuild flag naming this container
    pub fn flag(&self) -> &'static str {
        match self {
            ProjectKind::Workspace => "-workspace",
            ProjectKind::Project => "-project",
        }
    }
}

/// Platform classification of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectPlatform {
    Ios,
    Tvos,
    Mac,
}

impl ProjectPlatform {
    /// Classify from an SDKROOT or SUPPORTED_PLATFORMS value
    pub fn from_sdk(sdk: &str) -> Option<Self> {
        let sdk = sdk.to_lowercase();
        if sdk.contains("iphone") {
            Some(ProjectPlatform::Ios)
        } else if sdk.contains("appletv") {
            Some(ProjectPlatform::Tvos)
        } else if sdk.contains("macosx") {
            Some(ProjectPlatform::Mac)
        } else {
            None
        }
    }
}

/// The project descriptor consumed by scheme, device and command resolution
pub trait ProjectInfo {
    /// Path to the `.xcworkspace` or `.xcodeproj`
    fn path(&self) -> &Path;

    fn kind(&self) -> ProjectKind;

    /// Schemes the container exposes
    fn schemes(&self) -> Result<Vec<String>, ProjectError>;

    /// Scheme used for build-setting lookups
    fn set_scheme(&mut self, scheme: &str);

    /// Build setting value, empty when unset or unknown
    fn build_setting(&self, key: &str) -> String;

    /// Fail when build settings could not be read at all, so the platform
    /// is not silently taken to be the desktop
    fn ensure_build_settings(&self) -> Result<(), ProjectError> {
        Ok(())
    }

    fn platform(&self) -> ProjectPlatform {
        ProjectPlatform::from_sdk(&self.build_setting("SDKROOT"))
            .or_else(|| ProjectPlatform::from_sdk(&self.build_setting("SUPPORTED_PLATFORMS")))
            .unwrap_or(ProjectPlatform::Mac)
    }

    /// Product name, falling back to the container's file stem
    fn app_name(&self) -> String {
        let product = self.build_setting("PRODUCT_NAME");
        if !product.is_empty() {
            return product;
        }

        let wrapper = self.build_setting("WRAPPER_NAME");
        if let Some(name) = wrapper.strip_suffix(".app") {
            if !name.is_empty() {
                return name.to_string();
            }
        }

        self.path()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Directory holding the container, where the repo config file lives
    fn containing_dir(&self) -> PathBuf {
        match self.path().parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
