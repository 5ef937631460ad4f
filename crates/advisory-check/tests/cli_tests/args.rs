//! CLI argument tests (no npm or CLI under test required).

use super::advisory_check;
use predicates::prelude::*;

#[test]
fn test_arg_help() {
    advisory_check()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("outdated npm versions"));
}

#[test]
fn test_arg_version() {
    advisory_check()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("advisory-check"));
}

#[test]
fn test_arg_invalid_format() {
    advisory_check()
        .args(["--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid").or(predicate::str::contains("Invalid")));
}

#[test]
fn test_arg_invalid_threshold() {
    advisory_check()
        .args(["--threshold", "seven-ish"])
        .assert()
        .failure();
}

#[test]
fn test_arg_quiet_conflicts_with_verbose() {
    advisory_check()
        .args(["--quiet", "--verbose"])
        .assert()
        .failure();
}

#[test]
fn test_non_npm_package_manager_skips() {
    advisory_check()
        .args(["--package-manager", "yarn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"))
        .stdout(predicate::str::contains("yarn"));
}

#[test]
fn test_package_manager_env_var_skips() {
    advisory_check()
        .env("ADVISORY_CHECK_PACKAGE_MANAGER", "pnpm")
        .assert()
        .success()
        .stdout(predicate::str::contains("pnpm"));
}

#[test]
fn test_explicit_flag_wins_over_env_var() {
    // The env var says npm, but the flag forces a skip.
    advisory_check()
        .env("ADVISORY_CHECK_PACKAGE_MANAGER", "npm")
        .args(["--package-manager", "cnpm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cnpm"));
}

#[test]
fn test_quiet_skip_prints_nothing() {
    advisory_check()
        .args(["--package-manager", "yarn", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
