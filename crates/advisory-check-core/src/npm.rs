//! Package-manager control surface: version oracle and global installs.

use semver::Version;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Errors from the npm control surface.
#[derive(Error, Debug)]
pub enum NpmError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("\"{program} --version\" failed: {stderr}")]
    VersionQueryFailed { program: String, stderr: String },
    #[error("invalid npm version string returned from \"{program} --version\" [{raw}]")]
    InvalidVersion { program: String, raw: String },
    #[error("global install of npm@{spec} failed: {stderr}")]
    InstallFailed { spec: String, stderr: String },
}

/// Handle to the npm binary.
///
/// The globally installed npm version is process-external shared state.
/// It is single-writer: only the scenario runner installs versions, and
/// never while a CLI invocation is in flight.
#[derive(Debug, Clone)]
pub struct NpmClient {
    program: PathBuf,
}

impl NpmClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn program_display(&self) -> String {
        self.program.display().to_string()
    }

    /// Query the active npm version.
    ///
    /// # Errors
    /// Returns `NpmError::InvalidVersion` if the output does not parse as a
    /// semantic version. This is a precondition failure: the workflow must
    /// abort before any mutation, since restoring an unknown version
    /// afterward would be unsafe.
    pub fn current_version(&self) -> Result<Version, NpmError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|source| NpmError::Spawn {
                program: self.program_display(),
                source,
            })?;

        if !output.status.success() {
            return Err(NpmError::VersionQueryFailed {
                program: self.program_display(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Version::parse(&raw).map_err(|_| NpmError::InvalidVersion {
            program: self.program_display(),
            raw,
        })
    }

    /// Install a specific npm version (or version range) globally.
    ///
    /// # Errors
    /// Returns `NpmError::InstallFailed` on a non-zero exit. No retry; a
    /// failure here is fatal to the scenario.
    pub fn install_global(&self, spec: &str) -> Result<(), NpmError> {
        let output = Command::new(&self.program)
            .args(["install", "--global"])
            .arg(format!("npm@{spec}"))
            .output()
            .map_err(|source| NpmError::Spawn {
                program: self.program_display(),
                source,
            })?;

        if !output.status.success() {
            return Err(NpmError::InstallFailed {
                spec: spec.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}
