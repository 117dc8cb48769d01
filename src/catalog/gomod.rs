//! Reading the module path out of `go.mod`.

use anyhow::{Context, Result};
use std::path::Path;

use crate::constants::GO_MOD_FILE;
use crate::core::GotaskError;

/// Extracts the module path from the contents of a `go.mod` file.
///
/// Handles bare and quoted paths and trailing `//` comments. Returns `None` when
/// there is no `module` directive.
#[must_use]
pub fn module_path(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) && !rest.starts_with('"') {
            return None;
        }
        let path = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// Returns the import path of the module rooted at `project_dir`.
///
/// # Errors
///
/// Fails if `go.mod` cannot be read or has no `module` directive.
pub fn base_package(project_dir: &Path) -> Result<String> {
    let path = project_dir.join(GO_MOD_FILE);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    module_path(&contents).ok_or_else(|| {
        GotaskError::ConfigError {
            message: format!("{} has no module directive", path.display()),
        }
        .into()
    })
}
