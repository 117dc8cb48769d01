//! File system helpers shared by the installer and the tasks.
//!
//! Everything here is synchronous and touches at most a few paths.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Ensures a directory exists, creating it and all parents if needed.
///
/// # Errors
/// Returns an error if the path exists but is not a directory, or if the
/// directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
        return Ok(());
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Lexically normalizes a path by removing `.` components and resolving `..`.
///
/// Does not touch the filesystem, so symlinks are not resolved.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Makes `path` absolute against the current working directory and normalizes it.
///
/// Unlike [`std::fs::canonicalize`] the path does not need to exist, which matters
/// for binaries that have not been installed yet.
///
/// # Errors
/// Returns an error if the current directory cannot be determined.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(normalize_path(&cwd.join(path)))
}
