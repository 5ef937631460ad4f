//! Decision logic for when the npm version advisory must fire.

use semver::Version;

/// Package manager a `new` invocation resolves dependencies with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManagerChoice {
    /// No explicit flag; the CLI falls back to npm.
    Default,
    Npm,
    Yarn,
}

/// The CLI subcommand shapes the workflow exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Add,
    Update,
    Build,
    New {
        package_manager: PackageManagerChoice,
        skip_install: bool,
    },
}

impl CommandKind {
    /// Whether this command performs dependency installation.
    ///
    /// `build` compiles against what is already on disk and never resolves
    /// dependencies, so it can never trigger the advisory.
    #[must_use]
    pub const fn performs_install(self) -> bool {
        match self {
            Self::Add | Self::Update => true,
            Self::Build => false,
            Self::New { skip_install, .. } => !skip_install,
        }
    }

    /// Whether dependency installation would go through npm.
    ///
    /// The advisory is specific to npm; a `new` delegating to yarn must
    /// never warn regardless of the active npm version.
    #[must_use]
    pub const fn installs_via_npm(self) -> bool {
        !matches!(
            self,
            Self::New {
                package_manager: PackageManagerChoice::Yarn,
                ..
            }
        )
    }
}

/// Whether the advisory warning must appear for `kind` under `version`.
///
/// Truth table:
///
/// | version < threshold | performs install | installs via npm | warns |
/// |---------------------|------------------|------------------|-------|
/// | no                  | *                | *                | no    |
/// | yes                 | no               | *                | no    |
/// | yes                 | yes              | no               | no    |
/// | yes                 | yes              | yes              | yes   |
#[must_use]
pub fn warning_expected(kind: CommandKind, version: &Version, threshold: &Version) -> bool {
    version < threshold && kind.performs_install() && kind.installs_via_npm()
}
