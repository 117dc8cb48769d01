//! Package metadata as reported by `go list -json`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One compilation unit from the package listing.
///
/// Field names follow the `go list -json` record layout; every list defaults to
/// empty because `go list` omits empty fields.
///
/// The derived queries ([`source_files`](Self::source_files),
/// [`test_files`](Self::test_files), ...) are the accessors handed to
/// [`flatten`](crate::graph::flatten) when computing what a target depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PackageInfo {
    /// Absolute directory containing the package sources
    pub dir: PathBuf,
    /// Unique import path; the catalog key
    pub import_path: String,
    /// Declared package name (`main`, `tools`, ...)
    pub name: String,
    /// Install location for commands, if any
    pub target: Option<PathBuf>,
    /// Root of the module or GOPATH entry containing the package
    pub root: PathBuf,

    /// Ordinary `.go` sources
    pub go_files: Vec<String>,
    /// Sources excluded by build constraints
    pub ignored_go_files: Vec<String>,
    /// `_test.go` files in the package itself
    pub test_go_files: Vec<String>,
    /// `_test.go` files in the external `_test` package
    pub x_test_go_files: Vec<String>,

    /// Files matched by `//go:embed` in ordinary sources
    pub embed_files: Vec<String>,
    /// Files matched by `//go:embed` in internal tests
    pub test_embed_files: Vec<String>,
    /// Files matched by `//go:embed` in external tests
    pub x_test_embed_files: Vec<String>,

    /// Packages imported by ordinary sources
    pub imports: Vec<String>,
    /// Packages imported by internal tests
    pub test_imports: Vec<String>,
    /// Packages imported by external tests
    pub x_test_imports: Vec<String>,
}

impl PackageInfo {
    fn qualify<'a>(&'a self, groups: &[&'a [String]]) -> Vec<PathBuf> {
        groups.iter().flat_map(|group| group.iter()).map(|file| self.dir.join(file)).collect()
    }

    /// Files that contribute to an ordinary build: sources plus embeds,
    /// qualified with the package directory.
    #[must_use]
    pub fn source_files(&self) -> Vec<PathBuf> {
        self.qualify(&[&self.go_files, &self.embed_files])
    }

    /// Packages imported by an ordinary build.
    #[must_use]
    pub fn source_import_packages(&self) -> Vec<String> {
        self.imports.clone()
    }

    /// Files that contribute to the test binary: internal and external test
    /// sources plus their embeds.
    #[must_use]
    pub fn test_files(&self) -> Vec<PathBuf> {
        self.qualify(&[
            &self.test_go_files,
            &self.x_test_go_files,
            &self.test_embed_files,
            &self.x_test_embed_files,
        ])
    }

    /// Packages imported by this package's tests.
    #[must_use]
    pub fn test_import_packages(&self) -> Vec<String> {
        self.test_imports.iter().chain(&self.x_test_imports).cloned().collect()
    }

    /// Whether the package has any test sources.
    #[must_use]
    pub fn has_test(&self) -> bool {
        !self.test_go_files.is_empty() || !self.x_test_go_files.is_empty()
    }

    /// Directory of the package relative to its root, or the directory itself
    /// when it is not under the root.
    #[must_use]
    pub fn rel_path(&self) -> PathBuf {
        match self.dir.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
            Ok(rel) => rel.to_path_buf(),
            Err(_) => self.dir.clone(),
        }
    }

    /// Location of the compiled test binary: `<dir>/<name>.test`.
    #[must_use]
    pub fn test_binary(&self) -> PathBuf {
        self.dir.join(format!("{}.test", self.name))
    }

    /// Files in the package directory that are not part of the package proper
    /// (external tests and constraint-ignored sources), relative to the root.
    ///
    /// Linters that take `./...` miss these, so they are passed explicitly.
    #[must_use]
    pub fn indirect_files(&self) -> Vec<PathBuf> {
        let rel = self.rel_path();
        self.x_test_go_files.iter().chain(&self.ignored_go_files).map(|f| rel.join(f)).collect()
    }

    /// Whether `dir` is this package's directory.
    #[must_use]
    pub fn is_in_dir(&self, dir: &Path) -> bool {
        self.dir == dir
    }
}
