use anyhow::Result;
use predicates::prelude::*;

use gotask::constants::GOLANGCI_LINT_MODULE;

use crate::common::{OLD, TestProject};

#[test]
fn test_help_lists_commands() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    project
        .gotask()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build-tests"))
        .stdout(predicate::str::contains("mockgen"));
    Ok(())
}

#[test]
fn test_install_of_excluded_module_fails() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    project
        .gotask()
        .args(["install", "bin/golangci-lint", GOLANGCI_LINT_MODULE])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot install module"))
        .stderr(predicate::str::contains("go install"));
    assert!(!project.file("bin/golangci-lint").exists());
    Ok(())
}

#[test]
fn test_stale_reports_both_states() -> Result<()> {
    let project = TestProject::app_with_lib()?;

    project
        .gotask()
        .args(["stale", "bin/app", "main.go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is stale"));

    gotask::test_utils::write_at(&project.file("bin/app"), "", OLD + 10);
    project
        .gotask()
        .args(["stale", "bin/app", "main.go", "lib/lib.go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is up to date"));
    Ok(())
}

#[test]
fn test_stale_with_missing_input_fails() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    gotask::test_utils::write_at(&project.file("bin/app"), "", OLD);

    project
        .gotask()
        .args(["stale", "bin/app", "gone.go"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gone.go"));
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    project.write("gotask.toml", "test_timeout_secs = \"soon\"\n");

    project
        .gotask()
        .args(["stale", "bin/app", "main.go"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
    Ok(())
}

#[test]
fn test_stringer_without_inputs_is_a_usage_error() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    project
        .gotask()
        .args(["stringer", "bin/stringer", "Color", "color_string.go"])
        .assert()
        .failure()
        .code(2);
    Ok(())
}
