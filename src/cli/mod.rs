//! Command-line interface for gotask.
//!
//! Every subcommand builds one [`BuildContext`] for the project, hands it a
//! task or a query, and exits. Tasks declared by a subcommand share the
//! context's runner, so prerequisites such as tool installs happen at most
//! once per invocation.
//!
//! # Available Commands
//!
//! ## Inspection
//! - `packages` - List the packages `go list` reports for the project
//! - `deps` - Print the files a package's build (or test build) depends on
//! - `stale` - Report whether an output is older than its inputs
//!
//! ## Tasks
//! - `build` - Build the module's base package
//! - `build-tests` - Build every test binary without running it
//! - `test` - Build and run all tests
//! - `install` - Install a tool at the version pinned in `go.mod`
//! - `mockgen` - Generate the mocks listed in a directory's `mockgen.yaml`
//! - `stringer` - Generate `String` methods for one type
//! - `lint` - Lint the project with revive
//!
//! # Global Options
//!
//! - `--project-dir` - Project root (default: current directory)
//! - `--mod-dir` - Directory of the `go.mod` pinning tool versions
//! - `--config` - Settings file (default: `<project>/gotask.toml`)
//! - `--verbose` - Debug logging, and `-v` for test builds and runs
//! - `--quiet` - Errors only
//!
//! # Example
//!
//! ```bash
//! gotask build bin/app --tags netgo
//! gotask test --ginkgo bin/ginkgo
//! gotask mockgen bin/mockgen internal/server
//! RUST_LOG=gotask=debug gotask deps example.com/app --tests
//! ```

mod inspect;
mod run;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::tasks::BuildContext;
use crate::toolchain::GoToolchain;
use crate::utils::absolute_path;

/// Logging and settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Filter directive for the subscriber; `None` leaves `RUST_LOG` in charge.
    pub log_level: Option<String>,

    /// Force `-v` on test builds and runs.
    pub verbose: bool,

    /// Settings file given with `--config`.
    pub config_path: Option<PathBuf>,

    /// Tool `go.mod` directory given with `--mod-dir`.
    pub mod_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Creates a configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the global tracing subscriber. Does nothing if one is already
    /// installed.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }

    /// Loads settings for `project_dir` and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or is invalid.
    pub async fn load_settings(&self, project_dir: &Path) -> Result<Settings> {
        let mut settings = Settings::load(project_dir, self.config_path.as_deref()).await?;
        if self.verbose {
            settings.verbose = true;
        }
        if let Some(dir) = &self.mod_dir {
            settings.mod_dir = Some(dir.clone());
        }
        Ok(settings)
    }
}

/// Incremental build helpers for Go projects.
#[derive(Parser)]
#[command(
    name = "gotask",
    about = "Incremental build helpers for Go projects",
    version,
    long_about = "gotask builds, tests, and generates code for a Go module, running each \
                  external command only when its output is older than the files it depends on."
)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,

    /// Project root containing go.mod
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Directory of the go.mod that pins tool versions
    #[arg(long, global = true)]
    mod_dir: Option<PathBuf>,

    /// Path to the settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output and verbose test runs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the project's packages
    Packages(inspect::PackagesCommand),

    /// Print the files a package depends on
    Deps(inspect::DepsCommand),

    /// Report whether an output is older than its inputs
    Stale(inspect::StaleCommand),

    /// Build the module's base package
    Build(run::BuildCommand),

    /// Build every test binary
    BuildTests(run::BuildTestsCommand),

    /// Build and run all tests
    Test(run::TestCommand),

    /// Install a tool at its pinned version
    Install(run::InstallCommand),

    /// Generate mocks from a directory's mockgen.yaml
    Mockgen(run::MockgenCommand),

    /// Generate String methods for a type
    Stringer(run::StringerCommand),

    /// Lint the project with revive
    Lint(run::LintCommand),
}

impl Cli {
    /// Runs the selected command.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Derives a [`CliConfig`] from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            verbose: self.verbose,
            config_path: self.config.clone(),
            mod_dir: self.mod_dir.clone(),
        }
    }

    /// Runs the selected command with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let project_dir = absolute_path(&self.project_dir)?;
        let settings = config.load_settings(&project_dir).await?;
        let toolchain = GoToolchain::new(settings.go_command.clone());
        let ctx = BuildContext::new(project_dir, settings, Arc::new(toolchain));

        match self.command {
            Commands::Packages(cmd) => cmd.execute(&ctx).await,
            Commands::Deps(cmd) => cmd.execute(&ctx).await,
            Commands::Stale(cmd) => cmd.execute(&ctx),
            Commands::Build(cmd) => cmd.execute(&ctx).await,
            Commands::BuildTests(cmd) => cmd.execute(&ctx).await,
            Commands::Test(cmd) => cmd.execute(&ctx).await,
            Commands::Install(cmd) => cmd.execute(&ctx).await,
            Commands::Mockgen(cmd) => cmd.execute(&ctx).await,
            Commands::Stringer(cmd) => cmd.execute(&ctx).await,
            Commands::Lint(cmd) => cmd.execute(&ctx).await,
        }
    }
}
