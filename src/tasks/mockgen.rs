//! Generating mocks from a directory's `mockgen.yaml`.

use anyhow::Result;
use futures::future::{BoxFuture, join_all};
use std::path::{Path, PathBuf};

use super::{BuildContext, InstallTask, Task};
use crate::catalog::Catalog;
use crate::constants::MOCKGEN_MODULE;
use crate::core::GotaskError;
use crate::manifest::{MockSpec, MockgenManifest, mock_inputs, mock_output, mock_package};

/// `mockgen` arguments for one manifest entry.
pub(crate) fn mockgen_args(
    destination: &Path,
    package: &str,
    import_path: &str,
    types: &[String],
) -> Vec<String> {
    vec![
        "-destination".to_string(),
        destination.display().to_string(),
        "-package".to_string(),
        package.to_string(),
        import_path.to_string(),
        types.join(","),
    ]
}

/// Generates the mocks a directory's tests use.
///
/// Every entry of `<dir>/mockgen.yaml` becomes one `mock_<name>_test.go`,
/// generated concurrently with the others. An entry is regenerated when its
/// file is older than the manifest or, for packages of this project, than
/// any of that package's sources. All entries run to completion; if any
/// failed, one of the failures is returned.
#[derive(Debug, Clone)]
pub struct MockgenTask {
    mockgen_bin: PathBuf,
    dir: PathBuf,
    mod_dir: Option<PathBuf>,
}

impl MockgenTask {
    /// Generates mocks for `dir` using the mockgen binary at `mockgen_bin`.
    pub fn new(mockgen_bin: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            mockgen_bin: mockgen_bin.into(),
            dir: dir.into(),
            mod_dir: None,
        }
    }

    /// Directory of the `go.mod` that pins mockgen.
    #[must_use]
    pub fn mod_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.mod_dir = dir;
        self
    }

    fn install_task(&self) -> InstallTask {
        InstallTask::new(self.mockgen_bin.clone(), MOCKGEN_MODULE).mod_dir(self.mod_dir.clone())
    }

    /// Generates the mock for one manifest entry if it is out of date.
    async fn mock_package(
        &self,
        ctx: &BuildContext,
        catalog: &Catalog,
        manifest: &MockgenManifest,
        import_path: &str,
        spec: &MockSpec,
    ) -> Result<()> {
        let source_name = match catalog.get(import_path) {
            Some(pkg) => pkg.name.clone(),
            None => ctx.toolchain().package_name(ctx.project_dir(), import_path).await?,
        };
        let dir = manifest.dir();
        let output = mock_output(dir, &source_name);
        let inputs = mock_inputs(catalog, &manifest.path, import_path);

        if !crate::freshness::is_stale(&output, &inputs)? {
            tracing::debug!(target: "tasks", "File {} is up to date", output.display());
            return Ok(());
        }

        let dir_pkg = catalog.find_by_dir(dir).ok_or_else(|| GotaskError::PackageNotFound {
            name: dir.display().to_string(),
        })?;
        let package = mock_package(&dir_pkg.name, spec);

        ctx.run(&self.install_task()).await?;
        let bin = ctx.resolve(&self.mockgen_bin);
        let args = mockgen_args(&output, &package, import_path, &spec.types);
        ctx.execute(ctx.command(bin.display().to_string(), args)).await
    }
}

impl Task for MockgenTask {
    fn id(&self) -> String {
        format!("mockgen {}", self.dir.display())
    }

    fn name(&self) -> String {
        format!("Mockgen directory {}", self.dir.display())
    }

    fn run<'a>(&'a self, ctx: &'a BuildContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let dir = ctx.resolve(&self.dir);
            let manifest = MockgenManifest::load(&dir)?;
            let catalog = ctx.catalog().await?;

            let units = manifest.entries.iter().map(|(import_path, spec)| {
                self.mock_package(ctx, &catalog, &manifest, import_path, spec)
            });
            let results = join_all(units).await;

            let mut errors = results.into_iter().filter_map(Result::err);
            let first = errors.next();
            for extra in errors {
                tracing::warn!(target: "tasks", "Mock generation failed: {:#}", extra);
            }
            first.map_or(Ok(()), Err)
        })
    }
}
