//! The boundary between gotask and the Go toolchain
//!
//! Everything gotask learns from or asks of the outside world goes through the
//! [`Toolchain`] trait: listing packages, querying pinned module versions,
//! reading the build info embedded in a binary, installing a module, and
//! running a build or generator command. [`GoToolchain`] is the real
//! implementation on top of [`ToolCommand`]; tests substitute a recording fake.

use anyhow::Result;
use futures::future::BoxFuture;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::GO_QUERY_TIMEOUT;
use crate::core::GotaskError;
use crate::process::ToolCommand;

/// A single external command a task wants to run.
///
/// Invocations are plain data so they can be compared in tests. The real
/// toolchain runs them with stdio inherited, so build and test output reaches
/// the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Working directory, if not the current one
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation of `program` with `args`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            current_dir: None,
        }
    }

    /// Adds an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Access to the Go toolchain.
///
/// Object-safe so a [`BuildContext`](crate::tasks::BuildContext) can hold an
/// `Arc<dyn Toolchain>`.
pub trait Toolchain: Send + Sync + fmt::Debug {
    /// The `go` executable this toolchain runs.
    fn go_command(&self) -> &str;

    /// Raw `go list -json ./...` output for the packages under `dir`.
    fn list_packages<'a>(&'a self, dir: &'a Path) -> BoxFuture<'a, Result<Vec<u8>>>;

    /// Declared name of the package `import_path`, resolved from `dir`.
    fn package_name<'a>(&'a self, dir: &'a Path, import_path: &'a str)
    -> BoxFuture<'a, Result<String>>;

    /// Version of `module` pinned by the `go.mod` in `mod_dir`.
    fn module_version<'a>(
        &'a self,
        mod_dir: Option<&'a Path>,
        module: &'a str,
    ) -> BoxFuture<'a, Result<String>>;

    /// Main-module version embedded in the binary at `bin`.
    fn binary_version<'a>(&'a self, bin: &'a Path) -> BoxFuture<'a, Result<String>>;

    /// Installs `module` into `gobin` at the version pinned in `mod_dir`.
    fn install<'a>(
        &'a self,
        mod_dir: Option<&'a Path>,
        module: &'a str,
        gobin: &'a Path,
    ) -> BoxFuture<'a, Result<()>>;

    /// Runs a command, surfacing a non-zero exit as an error.
    fn run(&self, invocation: Invocation) -> BoxFuture<'_, Result<()>>;
}

/// [`Toolchain`] backed by a real `go` executable.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    go: String,
    query_timeout: Option<Duration>,
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self::new("go")
    }
}

impl GoToolchain {
    /// Creates a toolchain that runs `go` (a name on PATH or a path).
    pub fn new(go: impl Into<String>) -> Self {
        Self {
            go: go.into(),
            query_timeout: Some(GO_QUERY_TIMEOUT),
        }
    }

    /// Overrides the timeout applied to captured queries.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    fn query(&self) -> ToolCommand {
        ToolCommand::new(&self.go).with_timeout(self.query_timeout)
    }
}

impl Toolchain for GoToolchain {
    fn go_command(&self) -> &str {
        &self.go
    }

    fn list_packages<'a>(&'a self, dir: &'a Path) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            let output = self
                .query()
                .args(["list", "-json", "./..."])
                .current_dir(dir)
                .with_context("catalog")
                .execute()
                .await?;
            Ok(output.stdout.into_bytes())
        })
    }

    fn package_name<'a>(
        &'a self,
        dir: &'a Path,
        import_path: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.query()
                .args(["list", "-f", "{{.Name}}", import_path])
                .current_dir(dir)
                .execute_stdout()
                .await
        })
    }

    fn module_version<'a>(
        &'a self,
        mod_dir: Option<&'a Path>,
        module: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let version = self
                .query()
                .args(["list", "-f", "{{.Module.Version}}", module])
                .maybe_current_dir(mod_dir)
                .with_context("installer")
                .execute_stdout()
                .await?;
            tracing::debug!(target: "installer", "module {} version {}", module, version);
            Ok(version)
        })
    }

    fn binary_version<'a>(&'a self, bin: &'a Path) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let bin_arg = bin.to_string_lossy().into_owned();
            let output = self
                .query()
                .args(["version", "-m"])
                .arg(bin_arg)
                .with_context("installer")
                .execute_stdout()
                .await?;
            parse_build_info_version(&output).ok_or_else(|| {
                GotaskError::Other {
                    message: format!("{} carries no module build info", bin.display()),
                }
                .into()
            })
        })
    }

    fn install<'a>(
        &'a self,
        mod_dir: Option<&'a Path>,
        module: &'a str,
        gobin: &'a Path,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            ToolCommand::new(&self.go)
                .args(["install", module])
                .env("GOBIN", gobin.to_string_lossy())
                .maybe_current_dir(mod_dir)
                .inherit_stdio()
                .with_context("installer")
                .execute_success()
                .await
        })
    }

    fn run(&self, invocation: Invocation) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut cmd = ToolCommand::new(invocation.program)
                .args(invocation.args)
                .maybe_current_dir(invocation.current_dir.as_deref())
                .inherit_stdio()
                .with_context("tasks");
            for (key, value) in invocation.env {
                cmd = cmd.env(key, value);
            }
            cmd.execute_success().await
        })
    }
}

/// Extracts the main-module version from `go version -m` output.
///
/// The relevant line looks like `\tmod\tgolang.org/x/tools\tv0.20.0\th1:...`.
/// Binaries built from a local checkout report `(devel)`, which is returned
/// as-is and never matches a pinned version.
#[must_use]
pub fn parse_build_info_version(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        if fields.next()? != "mod" {
            return None;
        }
        let _path = fields.next()?;
        fields.next().map(ToString::to_string)
    })
}
