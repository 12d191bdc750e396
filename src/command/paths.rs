//! Run-scoped output paths

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{CommandError, TestCommandGenerator};
use crate::config::expand_tilde;

/// Paths computed once per run and reused on every later call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunCache {
    pub build_path: Option<PathBuf>,
    pub result_bundle_path: Option<PathBuf>,
}

fn ensure_dir(path: &Path) -> Result<(), CommandError> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Ok(());
    }
    debug!("creating {}", path.display());
    fs::create_dir_all(path).map_err(|source| CommandError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

impl<'a> TestCommandGenerator<'a> {
    /// `<archive_path>/<YYYY-MM-DD>`, fixed for the rest of the run
    pub fn build_path(&self, cache: &mut RunCache, today: NaiveDate) -> PathBuf {
        cache
            .build_path
            .get_or_insert_with(|| {
                expand_tilde(&self.config.archive_path).join(today.format("%Y-%m-%d").to_string())
            })
            .clone()
    }

    /// `<output_directory>/<scheme>.test_result`, fixed for the rest of the run
    pub fn result_bundle_path(&self, cache: &mut RunCache) -> PathBuf {
        cache
            .result_bundle_path
            .get_or_insert_with(|| {
                let scheme = self.config.scheme.as_deref().unwrap_or_default();
                expand_tilde(&self.config.output_directory).join(format!("{}.test_result", scheme))
            })
            .clone()
    }

    /// `<buildlog_path>/<app name>-<scheme>.log`
    pub fn log_path(&self) -> PathBuf {
        let scheme = self.config.scheme.as_deref().unwrap_or_default();
        expand_tilde(&self.config.buildlog_path)
            .join(format!("{}-{}.log", self.project.app_name(), scheme))
    }

    /// Create the directories the pipeline writes into: the log directory
    /// and, when a result bundle is requested, the output directory.
    pub fn prepare_directories(&self, cache: &mut RunCache) -> Result<(), CommandError> {
        if let Some(parent) = self.log_path().parent() {
            ensure_dir(parent)?;
        }
        if self.config.result_bundle {
            if let Some(parent) = self.result_bundle_path(cache).parent() {
                ensure_dir(parent)?;
            }
        }
        Ok(())
    }
}
