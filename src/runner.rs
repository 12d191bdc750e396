//! Run orchestration
//!
//! Ties the pieces together for one `rch-scan test` invocation:
//! - build the configuration from env and CLI layers
//! - detect the workspace or project
//! - rebuild the configuration with the repo file next to the project
//! - resolve scheme, device and destination
//! - assemble the command and prepare its output directories
//!
//! [`execute`] then runs the assembled pipeline through `bash -c`.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use rch_simctl::{Device, DeviceSource, SimctlError};
use rch_xcproject::{ProjectInfo, XcodeProject};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::command::{CommandError, OutputEnv, RunCache, TestCommandGenerator};
use crate::config::{ConfigError, EffectiveConfig, ScanConfig, REPO_CONFIG_PATH};
use crate::resolve::{self, ResolveError};

/// Errors from a run, mapped onto process exit codes
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("simulator listing failed: {0}")]
    Devices(#[from] SimctlError),

    #[error("{0}")]
    Command(#[from] CommandError),

    #[error("failed to spawn shell: {0}")]
    Spawn(#[source] io::Error),
}

impl RunError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Config(_) => 1,
            RunError::Resolve(ResolveError::Devices(_)) => 3,
            RunError::Resolve(_) => 2,
            RunError::Devices(_) => 3,
            RunError::Command(_) => 4,
            RunError::Spawn(_) => 5,
        }
    }
}

/// Result type for run operations
pub type RunResult<T> = Result<T, RunError>;

/// Inputs for one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Directory searched for the workspace or project
    pub dir: PathBuf,

    /// Explicit repo config file; defaults to `.rch/scan.toml` next to the project
    pub repo_config: Option<PathBuf>,

    /// Layer built from `SCAN_*` variables
    pub env_overrides: Option<Value>,

    /// Layer built from command-line flags
    pub cli_overrides: Option<Value>,

    /// Assemble only; do not touch the filesystem
    pub dry_run: bool,

    pub output_env: OutputEnv,
}

impl RunOptions {
    /// Repo config location for a detected project
    pub fn repo_config_path(&self, project: &dyn ProjectInfo) -> PathBuf {
        self.repo_config
            .clone()
            .unwrap_or_else(|| project.containing_dir().join(REPO_CONFIG_PATH))
    }

    /// Merge all layers using `repo_config` as the file layer
    pub fn effective_config(&self, repo_config: Option<&Path>) -> RunResult<EffectiveConfig> {
        Ok(EffectiveConfig::build(
            repo_config,
            self.env_overrides.clone(),
            self.cli_overrides.clone(),
        )?)
    }
}

/// Everything decided for one run, ready to execute
#[derive(Debug)]
pub struct PreparedRun<P = XcodeProject> {
    pub effective: EffectiveConfig,
    pub config: ScanConfig,
    pub project: P,
    pub device: Option<Device>,
    pub tokens: Vec<String>,
    pub cache: RunCache,
}

impl<P> PreparedRun<P> {
    /// The pipeline as a single shell line
    pub fn command_line(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Detect the workspace or project from env and CLI layers alone
fn detect(options: &RunOptions) -> RunResult<XcodeProject> {
    let initial = options
        .effective_config(options.repo_config.as_deref())?
        .scan_config()?;
    Ok(resolve::detect_project(&initial, &options.dir)?)
}

/// The merged configuration a run in `options.dir` would use.
///
/// The repo file is looked up next to the detected project; without one it
/// falls back to `.rch/scan.toml` under `options.dir`.
pub fn effective_for_dir(options: &RunOptions) -> RunResult<EffectiveConfig> {
    let repo_config = match detect(options) {
        Ok(project) => options.repo_config_path(&project),
        Err(e) => {
            debug!("no project for repo config lookup: {}", e);
            options
                .repo_config
                .clone()
                .unwrap_or_else(|| options.dir.join(REPO_CONFIG_PATH))
        }
    };
    debug!("repo config: {}", repo_config.display());
    options.effective_config(Some(&repo_config))
}

/// Detect the project and prepare a run against it
pub fn prepare(options: &RunOptions, devices: &dyn DeviceSource) -> RunResult<PreparedRun> {
    let project = detect(options)?;
    info!("Using {}", project.path().display());

    let repo_config = options.repo_config_path(&project);
    debug!("repo config: {}", repo_config.display());
    let effective = options.effective_config(Some(&repo_config))?;

    prepare_with(options, effective, project, devices)
}

/// Prepare a run against an already detected project
pub fn prepare_with<P: ProjectInfo>(
    options: &RunOptions,
    effective: EffectiveConfig,
    mut project: P,
    devices: &dyn DeviceSource,
) -> RunResult<PreparedRun<P>> {
    let mut config = effective.scan_config()?;
    let device = resolve::resolve_defaults(&mut config, &mut project, devices)?;

    let mut cache = RunCache::default();
    let generator = TestCommandGenerator::new(&config, &project, options.output_env);
    let tokens = generator.generate(&mut cache)?;
    if options.dry_run {
        debug!("dry run: skipping directory preparation");
    } else {
        generator.prepare_directories(&mut cache)?;
    }

    Ok(PreparedRun {
        effective,
        config,
        project,
        device,
        tokens,
        cache,
    })
}

/// Run a pipeline line through `bash -c` with inherited stdio.
///
/// Returns the pipeline's exit status; a run killed by a signal reports 1.
pub fn execute(command_line: &str) -> RunResult<i32> {
    info!("$ {}", command_line);

    let status = Command::new("bash")
        .arg("-c")
        .arg(command_line)
        .status()
        .map_err(RunError::Spawn)?;

    Ok(status.code().unwrap_or(1))
}
