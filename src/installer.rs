//! Installing developer tools at the versions pinned in `go.mod`
//!
//! A tool binary is kept in sync with the module version its project pins:
//!
//! 1. The exclusion policy is consulted; excluded modules are rejected.
//! 2. The version embedded in the installed binary is read. A binary that is
//!    missing or unreadable needs installing; an unreadable one is removed
//!    first.
//! 3. The pinned version is queried from the tools `go.mod`.
//! 4. Equal versions leave the binary alone. Otherwise the module is
//!    installed with `GOBIN` set to the binary's directory.
//!
//! No retries are attempted; any failure is returned to the caller.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::Path;

use crate::config::InstallPolicy;
use crate::toolchain::Toolchain;
use crate::utils::{absolute_path, ensure_dir};

/// What [`ensure_installed`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The binary already carried the pinned version.
    UpToDate {
        /// The pinned (and installed) version
        version: String,
    },
    /// The module was (re)installed.
    Installed {
        /// Version found in the old binary, if it could be read
        previous: Option<String>,
        /// The pinned version that was installed
        version: String,
    },
}

/// Reads the embedded version of `bin`, treating failure as "not installed".
///
/// An existing file whose version cannot be read is deleted so the install
/// that follows replaces it cleanly.
async fn installed_version(toolchain: &dyn Toolchain, bin: &Path) -> Result<Option<String>> {
    match toolchain.binary_version(bin).await {
        Ok(version) => {
            tracing::debug!(target: "installer", "{} version {}", bin.display(), version);
            Ok(Some(version))
        }
        Err(e) => {
            tracing::debug!(target: "installer", "{}: {:#}", bin.display(), e);
            match tokio::fs::remove_file(bin).await {
                Ok(()) => {
                    tracing::debug!(target: "installer", "Removed unreadable {}", bin.display());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove {}", bin.display()));
                }
            }
            Ok(None)
        }
    }
}

/// Makes sure `bin` is `module` at the version pinned in `mod_dir`.
///
/// # Errors
///
/// - [`GotaskError::ConfigurationRejection`](crate::core::GotaskError::ConfigurationRejection)
///   if the policy excludes `module`
/// - the toolchain's error if the pinned version cannot be queried or the
///   install fails
pub async fn ensure_installed(
    toolchain: &dyn Toolchain,
    policy: &InstallPolicy,
    bin: &Path,
    module: &str,
    mod_dir: Option<&Path>,
) -> Result<InstallOutcome> {
    policy.check(module)?;

    let previous = installed_version(toolchain, bin).await?;
    let version = toolchain.module_version(mod_dir, module).await?;

    if previous.as_deref() == Some(version.as_str()) {
        tracing::debug!(target: "installer", "Command {} is up to date", bin.display());
        return Ok(InstallOutcome::UpToDate {
            version,
        });
    }

    let parent = bin.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let gobin = absolute_path(parent)?;
    ensure_dir(&gobin)?;

    tracing::info!(
        target: "installer",
        "Installing {}@{} to {}",
        module,
        version,
        gobin.display()
    );
    toolchain.install(mod_dir, module, &gobin).await?;

    Ok(InstallOutcome::Installed {
        previous,
        version,
    })
}
