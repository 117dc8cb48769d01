//! The `mockgen.yaml` manifest
//!
//! A directory whose code uses mocks carries a `mockgen.yaml` naming, per
//! import path, the interface types to mock and whether the generated file
//! belongs to the external `_test` package:
//!
//! ```yaml
//! io:
//!   external: true
//!   types:
//!   - ReaderAt
//!   - Writer
//! example.com/app/store:
//!   types: [Store]
//! ```
//!
//! Each entry produces one file, `mock_<package name>_test.go`, in the
//! manifest's directory.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::constants::MOCKGEN_MANIFEST;
use crate::core::GotaskError;

/// Mock settings for one source package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MockSpec {
    /// Generate into the `_test` package of the directory
    #[serde(default)]
    pub external: bool,
    /// Interface types to mock
    #[serde(default)]
    pub types: Vec<String>,
}

/// A parsed `mockgen.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockgenManifest {
    /// Location of the manifest file
    pub path: PathBuf,
    /// Import path to mock settings, ordered by import path
    pub entries: BTreeMap<String, MockSpec>,
}

impl MockgenManifest {
    /// Reads `mockgen.yaml` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`GotaskError::MissingManifest`] if the file cannot be read or
    /// is not a mapping of import paths to mock settings.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MOCKGEN_MANIFEST);
        let contents =
            std::fs::read_to_string(&path).map_err(|e| GotaskError::MissingManifest {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::parse(path, &contents)
    }

    /// Parses manifest text that was read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GotaskError::MissingManifest`] on malformed YAML.
    pub fn parse(path: PathBuf, contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }
        let entries = serde_yaml::from_str(contents).map_err(|e| GotaskError::MissingManifest {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            path,
            entries,
        })
    }

    /// Directory containing the manifest.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Files the mock of `import_path` depends on.
///
/// Always the manifest itself. When the mocked package belongs to this
/// project, its ordinary Go sources are added as well; which of them declare
/// the mocked interfaces is not known, so all count.
#[must_use]
pub fn mock_inputs(catalog: &Catalog, manifest_path: &Path, import_path: &str) -> Vec<PathBuf> {
    let mut inputs = vec![manifest_path.to_path_buf()];
    if let Some(pkg) = catalog.get(import_path) {
        inputs.extend(pkg.go_files.iter().map(|file| pkg.dir.join(file)));
    }
    inputs
}

/// Path of the generated mock for a package named `package_name`.
#[must_use]
pub fn mock_output(dir: &Path, package_name: &str) -> PathBuf {
    dir.join(format!("mock_{package_name}_test.go"))
}

/// Package clause for a generated mock in a directory whose package is
/// `dir_package`.
#[must_use]
pub fn mock_package(dir_package: &str, spec: &MockSpec) -> String {
    if spec.external {
        format!("{dir_package}_test")
    } else {
        dir_package.to_string()
    }
}
