//! Compatibility-verification workflow for the npm version advisory.
//!
//! Verifies that a build CLI detects the globally installed npm version and
//! shows (or suppresses) its advisory warning accordingly: the scenario
//! installs an at/above-threshold npm, then a below-threshold one, runs a
//! fixed sequence of CLI invocations under each, checks every captured
//! stderr for the literal advisory text, and restores the original npm
//! version and working directory on every exit path.

pub mod assertion;
pub mod cleanup;
pub mod driver;
pub mod gating;
pub mod npm;
pub mod policy;
pub mod scenario;

pub use assertion::AssertionError;
pub use cleanup::CleanupError;
pub use driver::{CliDriver, DriverError, InvocationOutput};
pub use npm::{NpmClient, NpmError};
pub use policy::{CommandKind, PackageManagerChoice, warning_expected};
pub use scenario::{
    DEFAULT_WARNING_TEXT, InvocationRecord, InvocationSpec, Outcome, ScenarioConfig, ScenarioError,
    ScenarioRunner, WorkflowState,
};
