//! End-to-end runs of the binary against stub npm/ng scripts.

use super::advisory_check;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Stubs {
    _root: TempDir,
    npm: PathBuf,
    ng: PathBuf,
    project: PathBuf,
}

fn write_script(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Stub npm keeps its "installed" version in a state file; stub ng warns on
/// dependency-installing commands whenever that version is below 7.5.6.
fn stubs(emit_warnings: bool) -> Stubs {
    let root = TempDir::new().unwrap();
    let project = root.path().join("work/project");
    fs::create_dir_all(&project).unwrap();

    let state = root.path().join("npm-version");
    fs::write(&state, "6.14.8\n").unwrap();

    let npm = root.path().join("npm");
    write_script(
        &npm,
        &format!(
            r#"#!/bin/sh
state="{state}"
case "$1" in
  --version) cat "$state" ;;
  install)
    spec="${{3#npm@}}"
    printf '%s\n' "${{spec#>=}}" > "$state"
    ;;
  *) exit 1 ;;
esac
"#,
            state = state.display()
        ),
    );

    let ng = root.path().join("ng");
    write_script(
        &ng,
        &format!(
            r#"#!/bin/sh
state="{state}"
emit={emit}
below=1
version="$(cat "$state")"
if [ "$(printf '%s\n7.5.6\n' "$version" | sort -V | head -n 1)" = "7.5.6" ]; then below=0; fi
warn() {{
  if [ "$below" = 1 ] && [ "$emit" = 1 ]; then
    echo "npm version 7.5.6 or higher is recommended" >&2
  fi
}}
cmd="$1"
shift
case "$cmd" in
  update) warn ;;
  build) ;;
  add) warn ;;
  new)
    name=""
    pm="npm"
    skip=0
    for arg in "$@"; do
      case "$arg" in
        --package-manager=*) pm="${{arg#--package-manager=}}" ;;
        --skip-install) skip=1 ;;
        -*) ;;
        *) name="$arg" ;;
      esac
    done
    if [ "$pm" = "npm" ] && [ "$skip" = 0 ]; then warn; fi
    if [ -z "$name" ]; then
      echo 'The "name" argument is required.' >&2
      exit 1
    fi
    mkdir -p "$name"
    ;;
  *) exit 1 ;;
esac
exit 0
"#,
            state = state.display(),
            emit = i32::from(emit_warnings)
        ),
    );

    Stubs {
        _root: root,
        npm,
        ng,
        project,
    }
}

#[test]
fn test_stub_scenario_passes() {
    let stubs = stubs(true);
    advisory_check()
        .env("ADVISORY_CHECK_PACKAGE_MANAGER", "npm")
        .arg("--npm")
        .arg(&stubs.npm)
        .arg("--cli")
        .arg(&stubs.ng)
        .arg("--project-dir")
        .arg(&stubs.project)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "9 invocations matched their warning expectations",
        ));
}

#[test]
fn test_stub_scenario_json_report() {
    let stubs = stubs(true);
    let output = advisory_check()
        .env("ADVISORY_CHECK_PACKAGE_MANAGER", "npm")
        .arg("--npm")
        .arg(&stubs.npm)
        .arg("--cli")
        .arg(&stubs.ng)
        .arg("--project-dir")
        .arg(&stubs.project)
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .clone();

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 9);
    assert_eq!(records[0]["command"], "ng update");
    assert_eq!(records[0]["expected_warning"], false);
}

#[test]
fn test_stub_scenario_quiet_success_prints_nothing() {
    let stubs = stubs(true);
    advisory_check()
        .env("ADVISORY_CHECK_PACKAGE_MANAGER", "npm")
        .arg("--npm")
        .arg(&stubs.npm)
        .arg("--cli")
        .arg(&stubs.ng)
        .arg("--project-dir")
        .arg(&stubs.project)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_stub_scenario_quiet_suppresses_json_report() {
    let stubs = stubs(true);
    advisory_check()
        .env("ADVISORY_CHECK_PACKAGE_MANAGER", "npm")
        .arg("--npm")
        .arg(&stubs.npm)
        .arg("--cli")
        .arg(&stubs.ng)
        .arg("--project-dir")
        .arg(&stubs.project)
        .args(["--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_stub_scenario_silent_cli_fails_naming_invocation() {
    let stubs = stubs(false);
    advisory_check()
        .env("ADVISORY_CHECK_PACKAGE_MANAGER", "npm")
        .arg("--npm")
        .arg(&stubs.npm)
        .arg("--cli")
        .arg(&stubs.ng)
        .arg("--project-dir")
        .arg(&stubs.project)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ng add"));
}
