//! Cleanup coordinator: artifact removal and global-state restoration.

use crate::npm::{NpmClient, NpmError};
use crate::scenario::WorkflowState;
use semver::Version;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by cleanup. These are never swallowed: a corrupted global
/// npm version would affect every subsequent workflow run.
#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("failed to remove artifact {path}: {source}")]
    RemoveArtifact { path: PathBuf, source: io::Error },
    #[error("failed to restore working directory {path}: {source}")]
    RestoreDir { path: PathBuf, source: io::Error },
    #[error("failed to restore npm version {version}: {source}")]
    RestoreVersion { version: Version, source: NpmError },
}

/// Remove a directory tree. A missing path is not an error, which makes
/// cleanup idempotent.
///
/// # Errors
/// Returns any I/O error other than `NotFound`.
pub fn remove_recursive(path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Release everything the scenario acquired: generated project directories,
/// the working directory, and the globally installed npm version.
///
/// Every step is attempted even if an earlier one fails; the first error is
/// returned once all restoration has been tried. Version restoration in
/// particular must always run.
///
/// # Errors
/// Returns the first failure encountered across the cleanup steps.
pub fn cleanup(state: &WorkflowState, npm: &NpmClient) -> Result<(), CleanupError> {
    let mut first_error = None;

    for artifact in &state.artifacts {
        if let Err(source) = remove_recursive(artifact) {
            first_error.get_or_insert(CleanupError::RemoveArtifact {
                path: artifact.clone(),
                source,
            });
        }
    }

    if let Err(source) = std::env::set_current_dir(&state.original_dir) {
        first_error.get_or_insert(CleanupError::RestoreDir {
            path: state.original_dir.clone(),
            source,
        });
    }

    if let Err(source) = npm.install_global(&state.original_version.to_string()) {
        first_error.get_or_insert(CleanupError::RestoreVersion {
            version: state.original_version.clone(),
            source,
        });
    }

    first_error.map_or(Ok(()), Err)
}
