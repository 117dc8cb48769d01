//! Locating executables.

use std::path::{Path, PathBuf};

/// Resolves a program to the executable that will actually be spawned.
///
/// Programs given with a directory component (`bin/mockgen`) are used as-is, so a
/// tool installed into the project is preferred over one on PATH.
#[must_use]
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        return as_path.exists().then(|| as_path.to_path_buf());
    }
    which::which(program).ok()
}
