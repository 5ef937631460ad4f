//! Scenario runner: drives the CLI through both version regimes and asserts
//! the advisory warning at every step.

use crate::assertion::{self, AssertionError};
use crate::cleanup::{self, CleanupError};
use crate::driver::{CliDriver, DriverError};
use crate::gating;
use crate::npm::{NpmClient, NpmError};
use crate::policy::{self, CommandKind, PackageManagerChoice};
use semver::Version;
use serde::Serialize;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Advisory text the CLI under test prints for outdated npm versions.
pub const DEFAULT_WARNING_TEXT: &str = "npm version 7.5.6 or higher is recommended";

/// Errors that can occur while running a scenario.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("npm control error: {0}")]
    Npm(#[from] NpmError),
    #[error("CLI invocation error: {0}")]
    Driver(#[from] DriverError),
    #[error("warning assertion failed: {0}")]
    Assertion(#[from] AssertionError),
    #[error("cleanup failed: {0}")]
    Cleanup(#[from] CleanupError),
    #[error("failed to resolve project directory {path}: {source}")]
    ProjectDir { path: PathBuf, source: io::Error },
    #[error("failed to read current working directory: {0}")]
    CurrentDir(io::Error),
    #[error("failed to change working directory to {path}: {source}")]
    ChangeDir { path: PathBuf, source: io::Error },
    #[error("{primary}; cleanup also failed: {cleanup}")]
    CleanupAfterFailure {
        primary: Box<ScenarioError>,
        cleanup: CleanupError,
    },
}

/// Configuration for one scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// npm binary (overridable so tests can substitute a stub).
    pub npm_program: PathBuf,
    /// CLI under test.
    pub cli_program: PathBuf,
    /// Existing project the update/build invocations run in.
    pub project_dir: PathBuf,
    /// Minimum npm version below which the advisory must fire.
    pub threshold: Version,
    /// Install specifier for the at/above-threshold regime.
    pub high_spec: String,
    /// Exact version installed for the below-threshold regime.
    pub low_version: Version,
    /// Literal advisory text to look for.
    pub warning_text: String,
    /// Prerelease builds of the CLI need `--next` on update invocations.
    pub prerelease: bool,
    /// Package manager the surrounding harness runs with (gating).
    pub package_manager: String,
    /// Name of the project generated by `new --skip-install`.
    pub skip_install_project: String,
    /// Name of the project generated by `new --package-manager=yarn`.
    pub yarn_project: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            npm_program: "npm".into(),
            cli_program: "ng".into(),
            project_dir: ".".into(),
            threshold: Version::new(7, 5, 6),
            high_spec: ">=7.5.6".into(),
            low_version: Version::new(7, 4, 0),
            warning_text: DEFAULT_WARNING_TEXT.into(),
            prerelease: false,
            package_manager: "npm".into(),
            skip_install_project: "advisory-skip-install".into(),
            yarn_project: "advisory-yarn".into(),
        }
    }
}

/// One planned CLI invocation. Built per step, consumed once.
#[derive(Debug, Clone)]
pub struct InvocationSpec {
    pub label: String,
    pub kind: CommandKind,
    pub subcommand: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub expect_warning: bool,
    pub expect_failure: bool,
}

/// Outcome of one completed invocation. Immutable once captured.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationRecord {
    pub label: String,
    pub command: String,
    pub expected_warning: bool,
    pub warned: bool,
}

/// State captured at `INIT` and released by cleanup.
#[derive(Debug)]
pub struct WorkflowState {
    pub original_version: Version,
    pub original_dir: PathBuf,
    pub artifacts: Vec<PathBuf>,
}

/// Result of a scenario run that did not error.
#[derive(Debug)]
pub enum Outcome {
    /// Environment gating rejected the run; nothing was mutated.
    Skipped { reason: String },
    /// Every invocation matched its warning expectation.
    Completed { records: Vec<InvocationRecord> },
}

/// Ordered phases of the scenario state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    HighVersion,
    LowVersion,
    OutsideProject,
}

impl Phase {
    const ORDER: [Self; 3] = [Self::HighVersion, Self::LowVersion, Self::OutsideProject];
}

/// Drives the whole workflow. Sole owner of the global npm version and the
/// working directory for the duration of a run.
#[derive(Debug)]
pub struct ScenarioRunner {
    config: ScenarioConfig,
    npm: NpmClient,
    cli: CliDriver,
}

impl ScenarioRunner {
    #[must_use]
    pub fn new(config: ScenarioConfig) -> Self {
        let npm = NpmClient::new(&config.npm_program);
        let cli = CliDriver::new(&config.cli_program);
        Self { config, npm, cli }
    }

    #[must_use]
    pub const fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Run the scenario.
    ///
    /// # Errors
    /// See [`run_with_progress`](Self::run_with_progress).
    pub fn run(&self) -> Result<Outcome, ScenarioError> {
        self.run_with_progress(None)
    }

    /// Run the scenario, reporting each completed invocation to `on_step`.
    ///
    /// Execution is strictly sequential: every step depends on the global
    /// version state set by the previous one. Cleanup runs exactly once on
    /// every exit path after `INIT` has completed.
    ///
    /// # Errors
    /// Propagates the first precondition, mutation, invocation or assertion
    /// failure. If cleanup fails as well, both errors are reported via
    /// `ScenarioError::CleanupAfterFailure`.
    pub fn run_with_progress(
        &self,
        on_step: Option<&mut dyn FnMut(&InvocationRecord)>,
    ) -> Result<Outcome, ScenarioError> {
        if let Some(reason) = gating::skip_reason(&self.config.package_manager) {
            return Ok(Outcome::Skipped { reason });
        }

        // Precondition: the restore target must be a well-formed version
        // before anything is mutated. An unparseable version aborts here.
        let original_version = self.npm.current_version()?;
        let original_dir = env::current_dir().map_err(ScenarioError::CurrentDir)?;

        let project_dir =
            self.config
                .project_dir
                .canonicalize()
                .map_err(|source| ScenarioError::ProjectDir {
                    path: self.config.project_dir.clone(),
                    source,
                })?;
        let outside_dir = project_dir
            .parent()
            .map_or_else(|| project_dir.clone(), Path::to_path_buf);

        let state = WorkflowState {
            original_version,
            original_dir,
            artifacts: vec![
                outside_dir.join(&self.config.skip_install_project),
                outside_dir.join(&self.config.yarn_project),
            ],
        };

        let body = self.run_phases(&project_dir, &outside_dir, on_step);
        let restored = cleanup::cleanup(&state, &self.npm);

        match (body, restored) {
            (Ok(records), Ok(())) => Ok(Outcome::Completed { records }),
            (Ok(_), Err(cleanup_err)) => Err(cleanup_err.into()),
            (Err(primary), Ok(())) => Err(primary),
            (Err(primary), Err(cleanup_err)) => Err(ScenarioError::CleanupAfterFailure {
                primary: Box::new(primary),
                cleanup: cleanup_err,
            }),
        }
    }

    fn run_phases(
        &self,
        project_dir: &Path,
        outside_dir: &Path,
        mut on_step: Option<&mut dyn FnMut(&InvocationRecord)>,
    ) -> Result<Vec<InvocationRecord>, ScenarioError> {
        let mut records = Vec::new();

        for phase in Phase::ORDER {
            self.enter_phase(phase, project_dir, outside_dir)?;
            for spec in self.plan_phase(phase) {
                let record = self.run_step(&spec)?;
                if let Some(cb) = on_step.as_mut() {
                    cb(&record);
                }
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Apply a phase's state mutation before its invocations run.
    fn enter_phase(
        &self,
        phase: Phase,
        project_dir: &Path,
        outside_dir: &Path,
    ) -> Result<(), ScenarioError> {
        match phase {
            Phase::HighVersion => {
                env::set_current_dir(project_dir).map_err(|source| ScenarioError::ChangeDir {
                    path: project_dir.to_path_buf(),
                    source,
                })?;
                self.npm.install_global(&self.config.high_spec)?;
            }
            Phase::LowVersion => {
                self.npm
                    .install_global(&self.config.low_version.to_string())?;
            }
            Phase::OutsideProject => {
                env::set_current_dir(outside_dir).map_err(|source| ScenarioError::ChangeDir {
                    path: outside_dir.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Representative npm version of a phase's regime, for the warning
    /// policy. The high regime installs `>=threshold`, whose lowest
    /// admissible version is the threshold itself.
    fn regime_version(&self, phase: Phase) -> Version {
        match phase {
            Phase::HighVersion => self.config.threshold.clone(),
            Phase::LowVersion | Phase::OutsideProject => self.config.low_version.clone(),
        }
    }

    fn update_args(&self) -> Vec<String> {
        if self.config.prerelease {
            vec!["--next".to_string()]
        } else {
            Vec::new()
        }
    }

    fn step(
        &self,
        label: &str,
        kind: CommandKind,
        subcommand: &str,
        args: Vec<String>,
        env: Vec<(String, String)>,
        phase: Phase,
        expect_failure: bool,
    ) -> InvocationSpec {
        InvocationSpec {
            label: label.to_string(),
            kind,
            subcommand: subcommand.to_string(),
            args,
            env,
            expect_warning: policy::warning_expected(
                kind,
                &self.regime_version(phase),
                &self.config.threshold,
            ),
            expect_failure,
        }
    }

    /// The ordered invocation plan of a phase. Expectations are derived from
    /// the warning policy rather than written per step, which keeps the
    /// expected-warning/expected-failure matrix auditable in one place.
    fn plan_phase(&self, phase: Phase) -> Vec<InvocationSpec> {
        match phase {
            Phase::HighVersion => vec![
                self.step(
                    "ng update (npm at/above threshold)",
                    CommandKind::Update,
                    "update",
                    self.update_args(),
                    Vec::new(),
                    phase,
                    false,
                ),
                self.step(
                    "ng build (npm at/above threshold)",
                    CommandKind::Build,
                    "build",
                    vec!["--configuration=development".to_string()],
                    Vec::new(),
                    phase,
                    false,
                ),
            ],
            Phase::LowVersion => vec![
                self.step(
                    "ng add (npm below threshold)",
                    CommandKind::Add,
                    "add",
                    vec![
                        "@angular/localize".to_string(),
                        "--skip-confirmation".to_string(),
                    ],
                    vec![(
                        "NPM_CONFIG_legacy_peer_deps".to_string(),
                        "true".to_string(),
                    )],
                    phase,
                    false,
                ),
                self.step(
                    "ng update (npm below threshold)",
                    CommandKind::Update,
                    "update",
                    self.update_args(),
                    Vec::new(),
                    phase,
                    false,
                ),
                self.step(
                    "ng build (npm below threshold)",
                    CommandKind::Build,
                    "build",
                    vec!["--configuration=development".to_string()],
                    Vec::new(),
                    phase,
                    false,
                ),
            ],
            Phase::OutsideProject => vec![
                self.step(
                    "ng new (no arguments)",
                    CommandKind::New {
                        package_manager: PackageManagerChoice::Default,
                        skip_install: false,
                    },
                    "new",
                    Vec::new(),
                    Vec::new(),
                    phase,
                    // No project name: the invocation itself must fail, but
                    // its failure message still carries the warning.
                    true,
                ),
                self.step(
                    "ng new --package-manager=npm",
                    CommandKind::New {
                        package_manager: PackageManagerChoice::Npm,
                        skip_install: false,
                    },
                    "new",
                    vec!["--package-manager=npm".to_string()],
                    Vec::new(),
                    phase,
                    true,
                ),
                self.step(
                    "ng new --skip-install",
                    CommandKind::New {
                        package_manager: PackageManagerChoice::Default,
                        skip_install: true,
                    },
                    "new",
                    vec![
                        self.config.skip_install_project.clone(),
                        "--skip-install".to_string(),
                    ],
                    Vec::new(),
                    phase,
                    false,
                ),
                self.step(
                    "ng new --package-manager=yarn",
                    CommandKind::New {
                        package_manager: PackageManagerChoice::Yarn,
                        skip_install: false,
                    },
                    "new",
                    vec![
                        self.config.yarn_project.clone(),
                        "--package-manager=yarn".to_string(),
                    ],
                    Vec::new(),
                    phase,
                    false,
                ),
            ],
        }
    }

    fn run_step(&self, spec: &InvocationSpec) -> Result<InvocationRecord, ScenarioError> {
        let command = self.cli.render_command(&spec.subcommand, &spec.args);

        let captured = if spec.expect_failure {
            self.cli
                .invoke_expecting_failure(&spec.subcommand, &spec.args, &spec.env)?
        } else {
            self.cli.invoke(&spec.subcommand, &spec.args, &spec.env)?.stderr
        };

        let warned = captured.contains(&self.config.warning_text);
        assertion::check_warning(
            &captured,
            &self.config.warning_text,
            spec.expect_warning,
            &spec.label,
        )?;

        Ok(InvocationRecord {
            label: spec.label.clone(),
            command,
            expected_warning: spec.expect_warning,
            warned,
        })
    }
}
