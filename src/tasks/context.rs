//! Shared state for one resolution pass.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Task, TaskRunner};
use crate::catalog::{Catalog, CatalogCell, base_package};
use crate::config::Settings;
use crate::freshness::is_stale;
use crate::toolchain::{Invocation, Toolchain};
use crate::utils::absolute_path;

/// Everything a task needs: project location, settings, the toolchain, the
/// lazily loaded catalog, and the runner that deduplicates prerequisites.
///
/// One context is one resolution pass. Tasks that already ran in it will not
/// run again, so a fresh pass needs a fresh context.
///
/// # Examples
///
/// ```rust,no_run
/// use gotask::config::Settings;
/// use gotask::tasks::{BuildContext, BuildTask};
/// use gotask::toolchain::GoToolchain;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let ctx = BuildContext::new(".", Settings::default(), Arc::new(GoToolchain::default()));
/// ctx.run(&BuildTask::new("bin/app")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BuildContext {
    project_dir: PathBuf,
    settings: Settings,
    toolchain: Arc<dyn Toolchain>,
    catalog: CatalogCell,
    runner: TaskRunner,
}

impl BuildContext {
    /// Creates a context for the project rooted at `project_dir`.
    ///
    /// A relative `project_dir` is made absolute against the current
    /// directory; package directories from `go list` are always absolute.
    pub fn new(
        project_dir: impl Into<PathBuf>,
        settings: Settings,
        toolchain: Arc<dyn Toolchain>,
    ) -> Self {
        let project_dir = project_dir.into();
        let project_dir = absolute_path(&project_dir).unwrap_or(project_dir);
        Self {
            project_dir,
            settings,
            toolchain,
            catalog: CatalogCell::new(),
            runner: TaskRunner::new(),
        }
    }

    /// Uses `catalog` instead of running the package lister.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = CatalogCell::preloaded(catalog);
        self
    }

    /// Project root; external commands run here.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Effective settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The toolchain.
    #[must_use]
    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }

    /// The runner for this pass.
    #[must_use]
    pub const fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    /// Whether test builds and runs pass `-v`.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.settings.verbose
    }

    /// Resolves `path` against the project directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        crate::utils::normalize_path(&self.project_dir.join(path))
    }

    /// Directory of the `go.mod` pinning tool versions: `override_dir` if
    /// given, else the configured one, resolved against the project.
    #[must_use]
    pub fn mod_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        match override_dir {
            Some(dir) => self.resolve(dir),
            None => self.settings.resolved_mod_dir(&self.project_dir),
        }
    }

    /// The package catalog, loaded on first use.
    ///
    /// # Errors
    ///
    /// Returns [`GotaskError::CatalogLoadError`](crate::core::GotaskError::CatalogLoadError)
    /// if the listing fails.
    pub async fn catalog(&self) -> Result<Arc<Catalog>> {
        self.catalog.get_or_load(self.toolchain.as_ref(), &self.project_dir).await
    }

    /// Import path of the project's main module, from `go.mod`.
    ///
    /// # Errors
    ///
    /// Fails if `go.mod` is missing or has no module directive.
    pub fn base_package(&self) -> Result<String> {
        base_package(&self.project_dir)
    }

    /// Runs one task through the runner.
    ///
    /// # Errors
    ///
    /// Returns the task's error.
    pub async fn run(&self, task: &dyn Task) -> Result<()> {
        self.runner.run(self, task).await
    }

    /// Runs prerequisites concurrently, each id at most once.
    ///
    /// # Errors
    ///
    /// Returns the first failure.
    pub async fn run_deps(&self, tasks: Vec<Box<dyn Task>>) -> Result<()> {
        self.runner.run_all(self, &tasks).await
    }

    /// An invocation of `program` that runs in the project directory.
    pub fn command<I, S>(&self, program: impl Into<String>, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(program, args).current_dir(&self.project_dir)
    }

    /// An invocation of the configured `go` command.
    pub fn go<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command(self.toolchain.go_command(), args)
    }

    /// Runs `invocation` if `output` is stale with respect to `inputs`.
    ///
    /// Returns whether the command ran.
    ///
    /// # Errors
    ///
    /// Returns the freshness check's error or the command's failure.
    pub async fn run_if_stale(
        &self,
        output: &Path,
        inputs: &[PathBuf],
        invocation: Invocation,
    ) -> Result<bool> {
        if !is_stale(output, inputs)? {
            tracing::debug!(target: "tasks", "{} is up to date", output.display());
            return Ok(false);
        }
        self.execute(invocation).await?;
        Ok(true)
    }

    /// Runs `invocation` unconditionally.
    ///
    /// # Errors
    ///
    /// Returns the command's failure.
    pub async fn execute(&self, invocation: Invocation) -> Result<()> {
        tracing::info!(target: "tasks", "{}", invocation);
        self.toolchain.run(invocation).await
    }
}
