//! Generating `String` methods for enum-like Go types.

use anyhow::Result;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};

use super::{BuildContext, InstallTask, Task};
use crate::constants::STRINGER_MODULE;
use crate::core::GotaskError;
use crate::freshness::is_stale_recursive;

/// `stringer` arguments.
pub(crate) fn stringer_args(
    destination: &Path,
    type_name: &str,
    package_dir: &Path,
) -> Vec<String> {
    vec![
        "-output".to_string(),
        destination.display().to_string(),
        "-type".to_string(),
        type_name.to_string(),
        package_dir.display().to_string(),
    ]
}

/// Runs stringer for one type and writes the result to `destination`.
///
/// The destination is regenerated when it is older than any input file, any
/// file under an input directory, or the stringer binary itself. All inputs
/// are assumed to live in one package; the first input's directory is handed
/// to stringer as an absolute path so it is not mistaken for an import path.
#[derive(Debug, Clone)]
pub struct StringerTask {
    bin: PathBuf,
    type_name: String,
    destination: PathBuf,
    inputs: Vec<PathBuf>,
    mod_dir: Option<PathBuf>,
}

impl StringerTask {
    /// Generates `destination` for `type_name` declared in `inputs`.
    pub fn new(
        bin: impl Into<PathBuf>,
        type_name: impl Into<String>,
        destination: impl Into<PathBuf>,
        inputs: Vec<PathBuf>,
    ) -> Self {
        Self {
            bin: bin.into(),
            type_name: type_name.into(),
            destination: destination.into(),
            inputs,
            mod_dir: None,
        }
    }

    /// Directory of the `go.mod` that pins stringer.
    #[must_use]
    pub fn mod_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.mod_dir = dir;
        self
    }
}

impl Task for StringerTask {
    fn id(&self) -> String {
        format!("stringer {}", self.destination.display())
    }

    fn name(&self) -> String {
        format!("Stringer {}", self.type_name)
    }

    fn run<'a>(&'a self, ctx: &'a BuildContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let Some(first) = self.inputs.first() else {
                return Err(GotaskError::NoInputFiles {
                    target: self.type_name.clone(),
                }
                .into());
            };

            let install =
                InstallTask::new(self.bin.clone(), STRINGER_MODULE).mod_dir(self.mod_dir.clone());
            ctx.run(&install).await?;

            let bin = ctx.resolve(&self.bin);
            let destination = ctx.resolve(&self.destination);
            let mut inputs: Vec<PathBuf> = self.inputs.iter().map(|i| ctx.resolve(i)).collect();
            inputs.push(bin.clone());
            if !is_stale_recursive(&destination, &inputs)? {
                return Ok(());
            }

            let first = ctx.resolve(first);
            let package_dir = first.parent().unwrap_or(ctx.project_dir());
            let args = stringer_args(&destination, &self.type_name, package_dir);
            ctx.execute(ctx.command(bin.display().to_string(), args)).await
        })
    }
}
