//! Read-only commands: `packages`, `deps` and `stale`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::core::GotaskError;
use crate::freshness::is_stale;
use crate::graph::{source_dependencies, test_dependencies};
use crate::tasks::BuildContext;

/// List the project's packages, sorted by import path.
#[derive(Args, Debug)]
pub struct PackagesCommand {
    /// Only packages that have test files
    #[arg(long)]
    tests: bool,
}

impl PackagesCommand {
    pub async fn execute(self, ctx: &BuildContext) -> Result<()> {
        let catalog = ctx.catalog().await?;
        let packages =
            if self.tests { catalog.packages_with_tests() } else { catalog.packages() };

        if packages.is_empty() {
            println!("{}", "No packages found".yellow());
            return Ok(());
        }
        for pkg in packages {
            let marker =
                if pkg.has_test() { " (tests)".green().to_string() } else { String::new() };
            println!(
                "{} {}{}",
                pkg.import_path.bold(),
                pkg.rel_path().display().to_string().dimmed(),
                marker
            );
        }
        Ok(())
    }
}

/// Print the flattened file dependencies of a package.
#[derive(Args, Debug)]
pub struct DepsCommand {
    /// Import path or directory relative to the module root
    package: String,

    /// Files the test binary depends on instead of the package build
    #[arg(long)]
    tests: bool,
}

impl DepsCommand {
    pub async fn execute(self, ctx: &BuildContext) -> Result<()> {
        let catalog = ctx.catalog().await?;
        let info = catalog.resolve(&self.package).ok_or_else(|| GotaskError::PackageNotFound {
            name: self.package.clone(),
        })?;

        let files = if self.tests {
            test_dependencies(&catalog, &info.import_path)
        } else {
            source_dependencies(&catalog, &info.import_path)
        };
        for file in files {
            let shown = file.strip_prefix(ctx.project_dir()).unwrap_or(&file);
            println!("{}", shown.display());
        }
        Ok(())
    }
}

/// Report whether an output is older than any of its inputs.
#[derive(Args, Debug)]
pub struct StaleCommand {
    /// The generated file
    output: PathBuf,

    /// Files the output is generated from
    inputs: Vec<PathBuf>,
}

impl StaleCommand {
    pub fn execute(self, ctx: &BuildContext) -> Result<()> {
        let output = ctx.resolve(&self.output);
        let inputs: Vec<PathBuf> = self.inputs.iter().map(|i| ctx.resolve(i)).collect();
        if is_stale(&output, &inputs)? {
            println!("{} {}", self.output.display(), "is stale".yellow());
        } else {
            println!("{} {}", self.output.display(), "is up to date".green());
        }
        Ok(())
    }
}
