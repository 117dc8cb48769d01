//! Building the project's main package.

use anyhow::Result;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};

use super::{BuildContext, Task, format_tags, tagged_id};
use crate::graph::source_dependencies;

/// Builds the module's base package into an executable.
///
/// The executable is rebuilt when it is missing or older than any source or
/// embedded file reachable from the base package through project imports.
#[derive(Debug, Clone)]
pub struct BuildTask {
    exe: PathBuf,
    tags: Vec<String>,
}

impl BuildTask {
    /// Builds into `exe`, relative to the project directory.
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            tags: Vec::new(),
        }
    }

    /// Sets build tags.
    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// `go build` arguments.
pub(crate) fn build_args(exe: &Path, pkg: &str, tags: &[String]) -> Vec<String> {
    let mut args = vec!["build".to_string(), "-o".to_string(), exe.display().to_string()];
    args.extend(format_tags("-tags", tags));
    args.push(pkg.to_string());
    args
}

impl Task for BuildTask {
    fn id(&self) -> String {
        tagged_id(format!("build {}", self.exe.display()), &self.tags)
    }

    fn name(&self) -> String {
        format!("Build {}", self.exe.display())
    }

    fn run<'a>(&'a self, ctx: &'a BuildContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let catalog = ctx.catalog().await?;
            let pkg = ctx.base_package()?;
            let exe = ctx.resolve(&self.exe);
            let deps = source_dependencies(&catalog, &pkg);

            ctx.run_if_stale(&exe, &deps, ctx.go(build_args(&exe, &pkg, &self.tags))).await?;
            Ok(())
        })
    }
}
