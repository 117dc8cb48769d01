//! Commands that run tasks.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::tasks::{
    AllTestBuildTask, AllTestRunTask, BuildContext, BuildTask, InstallTask, MockgenTask,
    ReviveTask, StringerTask, Task, TestDriver,
};

fn driver(ginkgo: Option<PathBuf>) -> TestDriver {
    match ginkgo {
        Some(bin) => TestDriver::Ginkgo {
            bin,
        },
        None => TestDriver::Go,
    }
}

async fn run_task(ctx: &BuildContext, task: &dyn Task) -> Result<()> {
    ctx.run(task).await?;
    tracing::info!("{} finished", task.name());
    Ok(())
}

/// Build the module's base package.
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Output executable
    exe: PathBuf,

    /// Build tags, comma-separated or repeated
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
}

impl BuildCommand {
    pub async fn execute(self, ctx: &BuildContext) -> Result<()> {
        run_task(ctx, &BuildTask::new(self.exe).tags(self.tags)).await
    }
}

/// Build every test binary without running it.
#[derive(Args, Debug)]
pub struct BuildTestsCommand {
    /// Build with the ginkgo CLI at this path, installing it if needed
    #[arg(long, value_name = "BIN")]
    ginkgo: Option<PathBuf>,

    /// Build tags, comma-separated or repeated
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
}

impl BuildTestsCommand {
    pub async fn execute(self, ctx: &BuildContext) -> Result<()> {
        let task = AllTestBuildTask::new().tags(self.tags).driver(driver(self.ginkgo));
        run_task(ctx, &task).await
    }
}

/// Build all tests, then run them.
#[derive(Args, Debug)]
pub struct TestCommand {
    /// Run with the ginkgo CLI at this path, installing it if needed
    #[arg(long, value_name = "BIN")]
    ginkgo: Option<PathBuf>,

    /// Build tags, comma-separated or repeated
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
}

impl TestCommand {
    pub async fn execute(self, ctx: &BuildContext) -> Result<()> {
        let task = AllTestRunTask::new().tags(self.tags).driver(driver(self.ginkgo));
        run_task(ctx, &task).await
    }
}

/// Install a tool at the version pinned in `go.mod`.
#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Where the binary should live
    bin: PathBuf,

    /// Module providing the binary
    module: String,
}

impl InstallCommand {
    pub async fn execute(self, ctx: &BuildContext) -> Result<()> {
        let task = InstallTask::new(self.bin.clone(), self.module);
        ctx.run(&task).await?;
        println!("{} {}", "Installed".green(), self.bin.display());
        Ok(())
    }
}

/// Generate the mocks listed in a directory's `mockgen.yaml`.
#[derive(Args, Debug)]
pub struct MockgenCommand {
    /// The mockgen binary, installed if missing or outdated
    mockgen_bin: PathBuf,

    /// Directory containing mockgen.yaml
    dir: PathBuf,
}

impl MockgenCommand {
    pub async fn execute(self, ctx: &BuildContext) -> Result<()> {
        run_task(ctx, &MockgenTask::new(self.mockgen_bin, self.dir)).await
    }
}

/// Generate `String` methods for a type.
#[derive(Args, Debug)]
pub struct StringerCommand {
    /// The stringer binary, installed if missing or outdated
    bin: PathBuf,

    /// Type to generate for
    type_name: String,

    /// Generated file
    destination: PathBuf,

    /// Files declaring the type and its values
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl StringerCommand {
    pub async fn execute(self, ctx: &BuildContext) -> Result<()> {
        let task = StringerTask::new(self.bin, self.type_name, self.destination, self.inputs);
        run_task(ctx, &task).await
    }
}

/// Lint the project with revive.
#[derive(Args, Debug)]
pub struct LintCommand {
    /// The revive binary, installed if missing or outdated
    revive_bin: PathBuf,

    /// revive configuration file
    config: PathBuf,
}

impl LintCommand {
    pub async fn execute(self, ctx: &BuildContext) -> Result<()> {
        run_task(ctx, &ReviveTask::new(self.revive_bin, self.config)).await
    }
}
