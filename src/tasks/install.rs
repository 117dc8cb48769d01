//! Installing a tool binary as a task prerequisite.

use anyhow::Result;
use futures::future::BoxFuture;
use std::path::PathBuf;

use super::{BuildContext, Task};
use crate::installer::{InstallOutcome, ensure_installed};

/// Keeps the binary at `bin` in sync with the version of `module` pinned in
/// the tools `go.mod`.
///
/// Generators and linters list an `InstallTask` for their own binary as a
/// prerequisite; since the id depends only on `bin`, the install happens at
/// most once per pass no matter how many tasks need it.
#[derive(Debug, Clone)]
pub struct InstallTask {
    bin: PathBuf,
    module: String,
    mod_dir: Option<PathBuf>,
}

impl InstallTask {
    /// Installs `module` as `bin`.
    pub fn new(bin: impl Into<PathBuf>, module: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            module: module.into(),
            mod_dir: None,
        }
    }

    /// Reads the pinned version from the `go.mod` in `dir` instead of the
    /// configured tools directory.
    #[must_use]
    pub fn mod_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.mod_dir = dir;
        self
    }
}

impl Task for InstallTask {
    fn id(&self) -> String {
        format!("install {}", self.bin.display())
    }

    fn name(&self) -> String {
        format!("Install {}", self.bin.display())
    }

    fn run<'a>(&'a self, ctx: &'a BuildContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let bin = ctx.resolve(&self.bin);
            let mod_dir = ctx.mod_dir(self.mod_dir.as_deref());
            let outcome = ensure_installed(
                ctx.toolchain(),
                &ctx.settings().install,
                &bin,
                &self.module,
                Some(&mod_dir),
            )
            .await?;

            if let InstallOutcome::Installed {
                previous: Some(previous),
                version,
            } = &outcome
            {
                tracing::info!(
                    target: "installer",
                    "Replaced {} {} with {}",
                    bin.display(),
                    previous,
                    version
                );
            }
            Ok(())
        })
    }
}
