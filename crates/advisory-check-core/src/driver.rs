//! Invocation surface for the CLI under test.

use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Errors from driving the CLI under test.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to spawn \"{command}\": {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("command failed: \"{command}\"\n{message}")]
    CommandFailed { command: String, message: String },
    #[error("expected \"{command}\" to fail, but it succeeded")]
    UnexpectedSuccess { command: String },
}

/// Captured output of a completed invocation.
#[derive(Debug, Clone)]
pub struct InvocationOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Handle to the build CLI whose advisory behavior is being verified.
#[derive(Debug, Clone)]
pub struct CliDriver {
    program: PathBuf,
}

impl CliDriver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Render the full command line for error messages and records.
    #[must_use]
    pub fn render_command(&self, subcommand: &str, args: &[String]) -> String {
        let program = self
            .program
            .file_name()
            .map_or_else(|| self.program.display().to_string(), |n| {
                n.to_string_lossy().into_owned()
            });
        let mut parts = vec![program, subcommand.to_string()];
        parts.extend(args.iter().cloned());
        parts.join(" ")
    }

    /// Run a subcommand and capture its output.
    ///
    /// # Errors
    /// Returns `DriverError::CommandFailed` on a non-zero exit, carrying the
    /// combined stdout and stderr as the failure message.
    pub fn invoke(
        &self,
        subcommand: &str,
        args: &[String],
        env_overrides: &[(String, String)],
    ) -> Result<InvocationOutput, DriverError> {
        let command = self.render_command(subcommand, args);

        let output = Command::new(&self.program)
            .arg(subcommand)
            .args(args)
            .envs(env_overrides.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .map_err(|source| DriverError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(DriverError::CommandFailed {
                command,
                message: format!("{stdout}{stderr}"),
            });
        }

        Ok(InvocationOutput { stdout, stderr })
    }

    /// Run a subcommand documented to fail, returning its failure message.
    ///
    /// Failure to fail is the actual error here: an invocation that succeeds
    /// when it must not yields `DriverError::UnexpectedSuccess`.
    ///
    /// # Errors
    /// Returns `DriverError::UnexpectedSuccess` on a zero exit, or a spawn
    /// error if the process could not start at all.
    pub fn invoke_expecting_failure(
        &self,
        subcommand: &str,
        args: &[String],
        env_overrides: &[(String, String)],
    ) -> Result<String, DriverError> {
        match self.invoke(subcommand, args, env_overrides) {
            Ok(_) => Err(DriverError::UnexpectedSuccess {
                command: self.render_command(subcommand, args),
            }),
            Err(DriverError::CommandFailed { message, .. }) => Ok(message),
            Err(other) => Err(other),
        }
    }
}
