//! Linting the project with revive.

use anyhow::Result;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};

use super::{BuildContext, InstallTask, Task};
use crate::constants::REVIVE_MODULE;

pub(crate) fn revive_args(config: &Path, extra_files: &[PathBuf]) -> Vec<String> {
    let mut args = vec![
        "-formatter".to_string(),
        "unix".to_string(),
        "-config".to_string(),
        config.display().to_string(),
        "-set_exit_status".to_string(),
        "./...".to_string(),
    ];
    args.extend(extra_files.iter().map(|f| f.display().to_string()));
    args
}

/// Lints every file in the project with revive.
///
/// Lint has no output file, so it always runs. Files `./...` does not reach
/// (the base package's external tests and constraint-ignored sources) are
/// passed explicitly.
#[derive(Debug, Clone)]
pub struct ReviveTask {
    bin: PathBuf,
    config: PathBuf,
    mod_dir: Option<PathBuf>,
}

impl ReviveTask {
    /// Lints with the revive binary at `bin` and the configuration `config`.
    pub fn new(bin: impl Into<PathBuf>, config: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            config: config.into(),
            mod_dir: None,
        }
    }

    /// Directory of the `go.mod` that pins revive.
    #[must_use]
    pub fn mod_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.mod_dir = dir;
        self
    }
}

impl Task for ReviveTask {
    fn id(&self) -> String {
        format!("revive {}", self.bin.display())
    }

    fn name(&self) -> String {
        "Revive lint".to_string()
    }

    fn run<'a>(&'a self, ctx: &'a BuildContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let install =
                InstallTask::new(self.bin.clone(), REVIVE_MODULE).mod_dir(self.mod_dir.clone());
            ctx.run(&install).await?;

            let catalog = ctx.catalog().await?;
            let pkg = ctx.base_package()?;
            let extra = catalog.get(&pkg).map(|info| info.indirect_files()).unwrap_or_default();

            let bin = ctx.resolve(&self.bin);
            let args = revive_args(&self.config, &extra);
            ctx.execute(ctx.command(bin.display().to_string(), args)).await
        })
    }
}
