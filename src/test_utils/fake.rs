//! A recording stand-in for the Go toolchain.

use anyhow::Result;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::core::GotaskError;
use crate::toolchain::{Invocation, Toolchain};

/// One call made against a [`FakeToolchain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    /// `go list -json ./...`
    ListPackages {
        /// Directory listed
        dir: PathBuf,
    },
    /// `go list -f {{.Name}}`
    PackageName {
        /// Package queried
        import_path: String,
    },
    /// `go list -f {{.Module.Version}}`
    ModuleVersion {
        /// Module queried
        module: String,
    },
    /// `go version -m`
    BinaryVersion {
        /// Binary inspected
        bin: PathBuf,
    },
    /// `go install`
    Install {
        /// Directory of the tools `go.mod`
        mod_dir: Option<PathBuf>,
        /// Module installed
        module: String,
        /// Install directory
        gobin: PathBuf,
    },
    /// Any other command
    Run(Invocation),
}

/// Output flags whose value names a file the command writes.
const OUTPUT_FLAGS: &[&str] = &["-o", "-output", "-destination"];

/// [`Toolchain`] that answers from canned data and records every call.
///
/// Successful runs create the files named after `-o`, `-output` and
/// `-destination`, so a second freshness check sees them as up to date.
/// Installs write the binary (its content is the version) and record the
/// version, so a later version check passes.
#[derive(Debug, Default)]
pub struct FakeToolchain {
    listing: Vec<u8>,
    listing_fails: bool,
    package_names: HashMap<String, String>,
    module_versions: HashMap<String, String>,
    binary_versions: Mutex<HashMap<PathBuf, String>>,
    failing: Vec<String>,
    run_delay: Option<Duration>,
    calls: Mutex<Vec<ToolCall>>,
}

impl FakeToolchain {
    /// A toolchain with no packages and no pinned modules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw `go list -json` output.
    #[must_use]
    pub fn with_listing(mut self, listing: impl Into<Vec<u8>>) -> Self {
        self.listing = listing.into();
        self
    }

    /// Makes the package listing fail.
    #[must_use]
    pub const fn with_failing_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    /// Answers `package_name` for a package outside the project.
    #[must_use]
    pub fn with_package_name(mut self, import_path: &str, name: &str) -> Self {
        self.package_names.insert(import_path.to_string(), name.to_string());
        self
    }

    /// Pins `module` at `version`.
    #[must_use]
    pub fn with_module_version(mut self, module: &str, version: &str) -> Self {
        self.module_versions.insert(module.to_string(), version.to_string());
        self
    }

    /// Pretends `bin` is installed with `version` embedded.
    #[must_use]
    pub fn with_binary_version(self, bin: &Path, version: &str) -> Self {
        self.lock_versions().insert(bin.to_path_buf(), version.to_string());
        self
    }

    /// Fails every run whose command line contains `pattern`.
    #[must_use]
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.failing.push(pattern.to_string());
        self
    }

    /// Delays every run, so concurrent callers overlap.
    #[must_use]
    pub const fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = Some(delay);
        self
    }

    /// Every call so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the call log mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Commands run so far, in order.
    #[must_use]
    pub fn runs(&self) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ToolCall::Run(invocation) => Some(invocation),
                _ => None,
            })
            .collect()
    }

    /// Installs so far, in order.
    #[must_use]
    pub fn installs(&self) -> Vec<ToolCall> {
        self.calls().into_iter().filter(|call| matches!(call, ToolCall::Install { .. })).collect()
    }

    /// Number of package listings performed.
    #[must_use]
    pub fn listing_count(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, ToolCall::ListPackages { .. })).count()
    }

    fn record(&self, call: ToolCall) {
        self.calls.lock().expect("call log poisoned").push(call);
    }

    fn lock_versions(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, String>> {
        self.binary_versions.lock().expect("version map poisoned")
    }

    fn failure(program: &str, operation: &str, stderr: &str) -> anyhow::Error {
        GotaskError::ExternalProcessError {
            program: program.to_string(),
            operation: operation.to_string(),
            status: Some(1),
            stderr: stderr.to_string(),
        }
        .into()
    }
}

/// Name `go install` gives the binary of `module`: its last path element,
/// skipping a trailing major-version element such as `v2`.
fn binary_name(module: &str) -> &str {
    let mut parts = module.rsplit('/');
    let last = parts.next().unwrap_or(module);
    let is_major = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_major { parts.next().unwrap_or(last) } else { last }
}

fn output_files(args: &[String]) -> Vec<PathBuf> {
    args.windows(2)
        .filter(|pair| OUTPUT_FLAGS.contains(&pair[0].as_str()))
        .map(|pair| PathBuf::from(&pair[1]))
        .collect()
}

impl Toolchain for FakeToolchain {
    fn go_command(&self) -> &str {
        "go"
    }

    fn list_packages<'a>(&'a self, dir: &'a Path) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            self.record(ToolCall::ListPackages {
                dir: dir.to_path_buf(),
            });
            if self.listing_fails {
                return Err(Self::failure("go", "list", "go: cannot find main module"));
            }
            Ok(self.listing.clone())
        })
    }

    fn package_name<'a>(
        &'a self,
        _dir: &'a Path,
        import_path: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.record(ToolCall::PackageName {
                import_path: import_path.to_string(),
            });
            self.package_names.get(import_path).cloned().ok_or_else(|| {
                Self::failure("go", "list", &format!("package {import_path} is not in std"))
            })
        })
    }

    fn module_version<'a>(
        &'a self,
        _mod_dir: Option<&'a Path>,
        module: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.record(ToolCall::ModuleVersion {
                module: module.to_string(),
            });
            self.module_versions.get(module).cloned().ok_or_else(|| {
                Self::failure("go", "list", &format!("no required module provides {module}"))
            })
        })
    }

    fn binary_version<'a>(&'a self, bin: &'a Path) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.record(ToolCall::BinaryVersion {
                bin: bin.to_path_buf(),
            });
            self.lock_versions().get(bin).cloned().ok_or_else(|| {
                GotaskError::Other {
                    message: format!("{}: no build info", bin.display()),
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
            self.record(ToolCall::Install {
                mod_dir: mod_dir.map(Path::to_path_buf),
                module: module.to_string(),
                gobin: gobin.to_path_buf(),
            });
            let version = self
                .module_versions
                .get(module)
                .cloned()
                .ok_or_else(|| Self::failure("go", "install", "module not pinned"))?;
            let bin = gobin.join(binary_name(module));
            std::fs::create_dir_all(gobin)?;
            std::fs::write(&bin, version.as_bytes())?;
            self.lock_versions().insert(bin, version);
            Ok(())
        })
    }

    fn run(&self, invocation: Invocation) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.record(ToolCall::Run(invocation.clone()));
            if let Some(delay) = self.run_delay {
                tokio::time::sleep(delay).await;
            }

            let command_line = invocation.to_string();
            if self.failing.iter().any(|pattern| command_line.contains(pattern.as_str())) {
                let operation = invocation.args.first().map_or("run", String::as_str);
                return Err(Self::failure(&invocation.program, operation, "fake failure"));
            }

            for output in output_files(&invocation.args) {
                if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&output, command_line.as_bytes())?;
            }
            Ok(())
        })
    }
}
