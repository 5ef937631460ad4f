//! CLI integration tests.

mod args;
#[cfg(unix)]
mod stub_scenario;

use assert_cmd::Command;

pub fn advisory_check() -> Command {
    Command::cargo_bin("advisory-check").unwrap()
}
