//! Common test utilities for gotask integration tests
//!
//! [`TestProject`] lays out a small Go module on disk with controlled
//! modification times and wires it to a [`FakeToolchain`], so task behavior
//! can be checked without a Go installation.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

use gotask::config::Settings;
use gotask::tasks::BuildContext;
use gotask::test_utils::fixtures::{PackageFixture, app_with_lib, listing};
use gotask::test_utils::{FakeToolchain, write_at};

/// Modification time given to every fixture file.
pub const OLD: u64 = 1_000;

/// A time after any output the fake toolchain writes during a test.
pub fn later() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(OLD) + 3_600
}

/// A temporary Go module plus the `go list` records describing it.
pub struct TestProject {
    temp: TempDir,
    packages: Vec<PackageFixture>,
}

impl TestProject {
    /// `example.com/app` (main) importing `example.com/app/lib`, which has a
    /// test. All files are old.
    pub fn app_with_lib() -> Result<Self> {
        let temp = TempDir::new()?;
        let packages = app_with_lib(temp.path(), OLD);
        Ok(Self {
            temp,
            packages,
        })
    }

    /// Root directory of the module.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Absolute path of `rel` inside the project.
    pub fn file(&self, rel: &str) -> PathBuf {
        self.temp.path().join(rel)
    }

    /// Adds a package record.
    pub fn add_package(&mut self, package: PackageFixture) {
        self.packages.push(package);
    }

    /// Writes `rel` with an old modification time.
    pub fn write(&self, rel: &str, contents: &str) {
        write_at(&self.file(rel), contents, OLD);
    }

    /// Rewrites `rel` so it is newer than anything built so far.
    pub fn touch(&self, rel: &str) {
        let path = self.file(rel);
        let contents = std::fs::read_to_string(&path).unwrap_or_default();
        write_at(&path, &contents, later());
    }

    /// A fake toolchain that lists this project's packages.
    pub fn toolchain(&self) -> FakeToolchain {
        FakeToolchain::new().with_listing(listing(&self.packages))
    }

    /// A fresh resolution pass over the project.
    pub fn context(&self, toolchain: Arc<FakeToolchain>) -> BuildContext {
        BuildContext::new(self.path(), Settings::default(), toolchain)
    }

    /// The project root spelled relative to the test process's working
    /// directory, e.g. `../../tmp/.tmpXYZ`.
    pub fn relative_path(&self) -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        let mut rel: PathBuf = cwd.components().skip(1).map(|_| "..").collect();
        rel.push(self.path().strip_prefix("/").unwrap());
        rel
    }

    /// Like [`context`](Self::context), but built from
    /// [`relative_path`](Self::relative_path).
    pub fn relative_context(&self, toolchain: Arc<FakeToolchain>) -> BuildContext {
        BuildContext::new(self.relative_path(), Settings::default(), toolchain)
    }

    /// The gotask binary, pointed at this project.
    pub fn gotask(&self) -> Command {
        let mut cmd = Command::cargo_bin("gotask").unwrap();
        cmd.arg("--project-dir").arg(self.path());
        cmd
    }
}
