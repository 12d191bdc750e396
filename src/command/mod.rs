//! xcodebuild test command assembly
//!
//! Turns a resolved [`ScanConfig`] into the ordered tokens of one shell
//! pipeline:
//!
//! ```text
//! set -o pipefail && env NSUnbufferedIO=YES xcodebuild <options> [clean] test | tee '<log>' | xcpretty <flags>
//! ```
//!
//! Tokens are meant to be joined with single spaces. Every token embedding a
//! path or user value goes through [`shell::quote`]; `xcargs` is the one
//! deliberate exception and is passed through verbatim.

mod paths;
pub mod shell;

pub use paths::RunCache;

use rch_xcproject::ProjectInfo;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::{OutputStyle, ScanConfig};
use shell::{flag_with_value, quote_path};

/// xcpretty flag selecting the Travis formatter
pub const CI_FORMATTER_FLAG: &str = "-f `xcpretty-travis-formatter`";

/// Errors during command assembly
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No project/workspace found")]
    MissingProject,

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ambient signals that shape the formatter stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputEnv {
    /// Running on CI (`TRAVIS` is set)
    pub ci: bool,

    /// Colors are disabled (`NO_COLOR` is set and non-empty)
    pub colors_disabled: bool,
}

impl OutputEnv {
    pub fn from_env() -> Self {
        Self {
            ci: std::env::var_os("TRAVIS").is_some(),
            colors_disabled: std::env::var_os("NO_COLOR")
                .map(|v| !v.is_empty())
                .unwrap_or(false),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn present_path(value: &Option<PathBuf>) -> Option<&Path> {
    value.as_deref().filter(|p| !p.as_os_str().is_empty())
}

/// Builds the xcodebuild test pipeline for one run
pub struct TestCommandGenerator<'a> {
    config: &'a ScanConfig,
    project: &'a dyn ProjectInfo,
    env: OutputEnv,
}

impl<'a> TestCommandGenerator<'a> {
    pub fn new(config: &'a ScanConfig, project: &'a dyn ProjectInfo, env: OutputEnv) -> Self {
        Self {
            config,
            project,
            env,
        }
    }

    /// All tokens: prefix, options, actions, suffix, pipe
    pub fn generate(&self, cache: &mut RunCache) -> Result<Vec<String>, CommandError> {
        let mut parts = self.prefix();
        parts.extend(self.options(cache)?);
        parts.extend(self.actions());
        parts.extend(self.suffix());
        parts.extend(self.pipe());
        Ok(parts)
    }

    pub fn prefix(&self) -> Vec<String> {
        vec![
            "set -o pipefail &&".to_string(),
            "env NSUnbufferedIO=YES xcodebuild".to_string(),
        ]
    }

    /// Workspace or project, plus the scheme when one is known
    pub fn project_path_args(&self) -> Result<Vec<String>, CommandError> {
        let path = self.project.path();
        if path.as_os_str().is_empty() {
            return Err(CommandError::MissingProject);
        }

        let mut args = vec![format!("{} {}", self.project.kind().flag(), quote_path(path))];
        if let Some(scheme) = present(&self.config.scheme) {
            args.push(flag_with_value("-scheme", scheme));
        }
        Ok(args)
    }

    pub fn options(&self, cache: &mut RunCache) -> Result<Vec<String>, CommandError> {
        let config = self.config;
        let mut options = self.project_path_args()?;

        if let Some(configuration) = present(&config.configuration) {
            options.push(flag_with_value("-configuration", configuration));
        }
        if let Some(sdk) = present(&config.sdk) {
            options.push(flag_with_value("-sdk", sdk));
        }
        if let Some(destination) = present(&config.destination) {
            options.push(flag_with_value("-destination", destination));
        }
        if let Some(derived_data) = present_path(&config.derived_data_path) {
            options.push(format!("-derivedDataPath {}", quote_path(derived_data)));
        }
        if config.result_bundle {
            let bundle = self.result_bundle_path(cache);
            options.push(format!("-resultBundlePath {}", quote_path(&bundle)));
        }
        if config.code_coverage {
            options.push("-enableCodeCoverage YES".to_string());
        }
        if let Some(xcconfig) = present_path(&config.xcconfig) {
            options.push(format!("-xcconfig {}", quote_path(xcconfig)));
        }
        if let Some(xcargs) = present(&config.xcargs) {
            options.push(xcargs.to_string());
        }

        Ok(options)
    }

    /// `clean` when requested, then `test`
    pub fn actions(&self) -> Vec<String> {
        let mut actions = Vec::new();
        if self.config.clean {
            actions.push("clean".to_string());
        }
        actions.push("test".to_string());
        actions
    }

    pub fn suffix(&self) -> Vec<String> {
        Vec::new()
    }

    /// xcpretty flags in order: CI formatter, no-color, output style
    pub fn formatter_flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.env.ci {
            flags.push(CI_FORMATTER_FLAG);
        }
        if self.env.colors_disabled {
            flags.push("--no-color");
        }
        match self.config.output_style {
            Some(OutputStyle::Basic) => flags.push("--no-utf"),
            Some(OutputStyle::Rspec) => flags.push("--test"),
            Some(OutputStyle::Standard) | None => {}
        }
        flags
    }

    /// Raw log through `tee`, then xcpretty
    pub fn pipe(&self) -> Vec<String> {
        let flags = self.formatter_flags();
        if self.env.ci {
            info!("Automatically switched to Travis formatter");
        }

        let mut formatter = "xcpretty".to_string();
        if !flags.is_empty() {
            formatter.push(' ');
            formatter.push_str(&flags.join(" "));
        }

        vec![format!(
            "| tee {} | {}",
            quote_path(&self.log_path()),
            formatter
        )]
    }
}
