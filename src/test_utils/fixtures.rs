//! Package records and project layouts for tests.

use serde_json::{Value, json};
use std::path::Path;

use super::write_at;
use crate::catalog::PackageInfo;

/// Builder for one `go list -json` record.
#[derive(Debug, Clone)]
pub struct PackageFixture {
    record: serde_json::Map<String, Value>,
}

impl PackageFixture {
    /// A package named after the last element of `import_path`, living in
    /// `root/<rel>`.
    #[must_use]
    pub fn new(root: &Path, rel: &str, import_path: &str) -> Self {
        let dir = if rel.is_empty() || rel == "." { root.to_path_buf() } else { root.join(rel) };
        let name = import_path.rsplit('/').next().unwrap_or(import_path);
        let mut record = serde_json::Map::new();
        record.insert("Dir".into(), json!(dir));
        record.insert("Root".into(), json!(root));
        record.insert("ImportPath".into(), json!(import_path));
        record.insert("Name".into(), json!(name));
        Self {
            record,
        }
    }

    fn list(mut self, key: &str, items: &[&str]) -> Self {
        self.record.insert(key.into(), json!(items));
        self
    }

    /// Sets the declared package name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.record.insert("Name".into(), json!(name));
        self
    }

    /// Sets `GoFiles`.
    #[must_use]
    pub fn go_files(self, files: &[&str]) -> Self {
        self.list("GoFiles", files)
    }

    /// Sets `EmbedFiles`.
    #[must_use]
    pub fn embed_files(self, files: &[&str]) -> Self {
        self.list("EmbedFiles", files)
    }

    /// Sets `TestGoFiles`.
    #[must_use]
    pub fn test_go_files(self, files: &[&str]) -> Self {
        self.list("TestGoFiles", files)
    }

    /// Sets `XTestGoFiles`.
    #[must_use]
    pub fn x_test_go_files(self, files: &[&str]) -> Self {
        self.list("XTestGoFiles", files)
    }

    /// Sets `IgnoredGoFiles`.
    #[must_use]
    pub fn ignored_go_files(self, files: &[&str]) -> Self {
        self.list("IgnoredGoFiles", files)
    }

    /// Sets `Imports`.
    #[must_use]
    pub fn imports(self, imports: &[&str]) -> Self {
        self.list("Imports", imports)
    }

    /// Sets `TestImports`.
    #[must_use]
    pub fn test_imports(self, imports: &[&str]) -> Self {
        self.list("TestImports", imports)
    }

    /// Sets `XTestImports`.
    #[must_use]
    pub fn x_test_imports(self, imports: &[&str]) -> Self {
        self.list("XTestImports", imports)
    }

    /// The record as JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.record.clone())
    }

    /// The record decoded into a [`PackageInfo`].
    ///
    /// # Panics
    ///
    /// Panics if the record does not decode, which indicates a fixture bug.
    #[must_use]
    pub fn build(&self) -> PackageInfo {
        serde_json::from_value(self.to_json()).expect("fixture record must decode")
    }
}

/// Concatenates records the way `go list -json` prints them.
#[must_use]
pub fn listing(packages: &[PackageFixture]) -> Vec<u8> {
    packages
        .iter()
        .map(|pkg| format!("{:#}\n", pkg.to_json()))
        .collect::<String>()
        .into_bytes()
}

/// A two-package module on disk: `example.com/app` (main) importing
/// `example.com/app/lib`, which has a test. Every file has mtime `secs`.
///
/// Returns the package records.
#[must_use]
pub fn app_with_lib(root: &Path, secs: u64) -> Vec<PackageFixture> {
    write_at(&root.join("go.mod"), "module example.com/app\n\ngo 1.22\n", secs);
    write_at(&root.join("main.go"), "package main\n", secs);
    write_at(&root.join("lib/lib.go"), "package lib\n", secs);
    write_at(&root.join("lib/lib_test.go"), "package lib\n", secs);

    vec![
        PackageFixture::new(root, ".", "example.com/app")
            .name("main")
            .go_files(&["main.go"])
            .imports(&["example.com/app/lib", "fmt"]),
        PackageFixture::new(root, "lib", "example.com/app/lib")
            .go_files(&["lib.go"])
            .test_go_files(&["lib_test.go"])
            .imports(&["strings"])
            .test_imports(&["testing"]),
    ]
}
