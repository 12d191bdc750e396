//! `xcodebuild`-backed project descriptor

use std::cell::OnceCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::schemes::parse_scheme_list;
use crate::settings::parse_build_settings;
use crate::{ProjectError, ProjectInfo, ProjectKind};

/// A workspace or project on disk, queried lazily through `xcodebuild`
#[derive(Debug)]
pub struct XcodeProject {
    path: PathBuf,
    kind: ProjectKind,
    scheme: Option<String>,
    xcodebuild: PathBuf,
    schemes: OnceCell<Vec<String>>,
    build_settings: OnceCell<Result<HashMap<String, String>, String>>,
    /// Settings were supplied up front and never come from xcodebuild
    preloaded: bool,
}

impl XcodeProject {
    pub fn new(path: impl Into<PathBuf>, kind: ProjectKind) -> Self {
        Self {
            path: path.into(),
            kind,
            scheme: None,
            xcodebuild: PathBuf::from("xcodebuild"),
            schemes: OnceCell::new(),
            build_settings: OnceCell::new(),
            preloaded: false,
        }
    }

    /// A project whose schemes and build settings are already known
    pub fn from_parts(
        path: impl Into<PathBuf>,
        kind: ProjectKind,
        schemes: Vec<String>,
        build_settings: HashMap<String, String>,
    ) -> Self {
        let mut project = Self::new(path, kind);
        project.preloaded = true;
        let _ = project.schemes.set(schemes);
        let _ = project.build_settings.set(Ok(build_settings));
        project
    }

    /// Use a specific `xcodebuild` binary
    pub fn with_xcodebuild(mut self, xcodebuild: impl Into<PathBuf>) -> Self {
        self.xcodebuild = xcodebuild.into();
        self
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    fn container_args(&self) -> Vec<String> {
        vec![
            self.kind.flag().to_string(),
            self.path.to_string_lossy().to_string(),
        ]
    }

    fn run_xcodebuild(&self, args: &[String]) -> Result<String, ProjectError> {
        debug!("running {} {}", self.xcodebuild.display(), args.join(" "));
        let output = Command::new(&self.xcodebuild).args(args).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProjectError::XcodebuildFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn load_schemes(&self) -> Result<Vec<String>, ProjectError> {
        let mut args = vec!["-list".to_string()];
        args.extend(self.container_args());
        Ok(parse_scheme_list(&self.run_xcodebuild(&args)?))
    }

    fn load_build_settings(&self) -> Result<HashMap<String, String>, ProjectError> {
        let mut args = vec!["-showBuildSettings".to_string()];
        args.extend(self.container_args());
        if let Some(ref scheme) = self.scheme {
            args.push("-scheme".to_string());
            args.push(scheme.clone());
        }
        Ok(parse_build_settings(&self.run_xcodebuild(&args)?))
    }

    fn settings(&self) -> &Result<HashMap<String, String>, String> {
        self.build_settings.get_or_init(|| {
            self.load_build_settings().map_err(|e| {
                warn!(
                    "could not read build settings for {}: {}",
                    self.path.display(),
                    e
                );
                e.to_string()
            })
        })
    }
}

impl ProjectInfo for XcodeProject {
    fn path(&self) -> &Path {
        &self.path
    }

    fn kind(&self) -> ProjectKind {
        self.kind
    }

    fn schemes(&self) -> Result<Vec<String>, ProjectError> {
        if let Some(schemes) = self.schemes.get() {
            return Ok(schemes.clone());
        }
        let schemes = self.load_schemes()?;
        let _ = self.schemes.set(schemes.clone());
        Ok(schemes)
    }

    fn set_scheme(&mut self, scheme: &str) {
        if self.scheme.as_deref() == Some(scheme) {
            return;
        }
        self.scheme = Some(scheme.to_string());
        // Settings loaded from xcodebuild depend on the scheme
        if !self.preloaded {
            self.build_settings = OnceCell::new();
        }
    }

    fn build_setting(&self, key: &str) -> String {
        match self.settings() {
            Ok(settings) => settings.get(key).cloned().unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    fn ensure_build_settings(&self) -> Result<(), ProjectError> {
        self.settings().as_ref()
            .map(|_| ())
            .map_err(|e| ProjectError::XcodebuildFailed(e.clone()))
    }
}
