//! Environment gating: conditions under which the workflow is skipped.

use std::env;

/// Env var naming the package manager the surrounding harness runs with.
pub const PACKAGE_MANAGER_ENV: &str = "ADVISORY_CHECK_PACKAGE_MANAGER";

/// Resolve the active package manager under test.
///
/// An explicit configuration wins over the environment; the default is npm.
#[must_use]
pub fn active_package_manager(configured: Option<&str>) -> String {
    configured.map_or_else(
        || env::var(PACKAGE_MANAGER_ENV).unwrap_or_else(|_| "npm".to_string()),
        ToString::to_string,
    )
}

/// Reason to skip the whole workflow, if any.
///
/// The scenario only makes sense when npm is the package manager under test,
/// and Windows rejects replacing the global npm while npm itself is running.
#[must_use]
pub fn skip_reason(package_manager: &str) -> Option<String> {
    if package_manager != "npm" {
        return Some(format!(
            "active package manager is {package_manager}, not npm"
        ));
    }
    if cfg!(windows) {
        return Some("installing npm over itself fails with permission errors on Windows".into());
    }
    None
}
