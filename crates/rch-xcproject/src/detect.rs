//! Workspace / project detection

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{ProjectError, ProjectKind, XcodeProject};

/// Containers with the given extension directly inside `dir`, sorted by name
fn find_containers(dir: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .filter(|p| p.extension().map(|ext| ext == extension).unwrap_or(false))
        .collect()
}

fn pick_single(
    dir: &Path,
    extension: &str,
    mut found: Vec<PathBuf>,
) -> Result<Option<PathBuf>, ProjectError> {
    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        _ => Err(ProjectError::Ambiguous {
            kind: extension.to_string(),
            dir: dir.to_path_buf(),
            candidates: found
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Find the container to test.
///
/// An explicit workspace or project wins. Otherwise a single `.xcworkspace`
/// in `dir` is preferred over a single `.xcodeproj`.
pub fn detect_project(
    dir: &Path,
    workspace: Option<&Path>,
    project: Option<&Path>,
) -> Result<XcodeProject, ProjectError> {
    if let Some(ws) = workspace {
        return Ok(XcodeProject::new(ws, ProjectKind::Workspace));
    }
    if let Some(proj) = project {
        return Ok(XcodeProject::new(proj, ProjectKind::Project));
    }

    if let Some(ws) = pick_single(dir, "xcworkspace", find_containers(dir, "xcworkspace"))? {
        return Ok(XcodeProject::new(ws, ProjectKind::Workspace));
    }
    if let Some(proj) = pick_single(dir, "xcodeproj", find_containers(dir, "xcodeproj"))? {
        return Ok(XcodeProject::new(proj, ProjectKind::Project));
    }

    Err(ProjectError::NotFound(dir.to_path_buf()))
}
