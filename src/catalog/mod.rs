//! Package catalog: every package of the project, keyed by import path
//!
//! The catalog is built once per invocation from the record stream printed by
//! `go list -json ./...` and is read-only afterwards. [`CatalogCell`] is the
//! load-once guard: the first caller runs the listing, every later (or
//! concurrent) caller receives the same [`Arc<Catalog>`]. There is no API to
//! mutate a catalog after construction, so sharing it across concurrent tasks
//! needs no further synchronization.
//!
//! # Example
//!
//! ```rust
//! use gotask::catalog::Catalog;
//!
//! let stream = br#"
//! {"Dir": "/src/app", "ImportPath": "example.com/app", "Name": "main",
//!  "GoFiles": ["main.go"], "Imports": ["example.com/app/lib"]}
//! {"Dir": "/src/app/lib", "ImportPath": "example.com/app/lib", "Name": "lib",
//!  "GoFiles": ["lib.go"]}
//! "#;
//! let catalog = Catalog::from_reader(&stream[..]).unwrap();
//! assert_eq!(catalog.len(), 2);
//! assert!(catalog.get("example.com/app/lib").is_some());
//! ```

mod gomod;
mod package;

pub use gomod::{base_package, module_path};
pub use package::PackageInfo;

use anyhow::Result;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::core::GotaskError;
use crate::toolchain::Toolchain;

/// Immutable mapping from import path to [`PackageInfo`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    packages: HashMap<String, PackageInfo>,
}

impl Catalog {
    /// Builds a catalog from already-decoded packages.
    ///
    /// A later package with the same import path replaces an earlier one.
    pub fn from_packages(packages: impl IntoIterator<Item = PackageInfo>) -> Self {
        let packages = packages.into_iter().map(|pkg| (pkg.import_path.clone(), pkg)).collect();
        Self {
            packages,
        }
    }

    /// Decodes a stream of concatenated JSON package records.
    ///
    /// Records are decoded one at a time until end of stream. Any malformed
    /// record aborts the whole decode.
    ///
    /// # Errors
    ///
    /// Returns [`GotaskError::CatalogLoadError`] describing the first bad record.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let stream = serde_json::Deserializer::from_reader(reader).into_iter::<PackageInfo>();
        let mut packages = HashMap::new();
        for (index, record) in stream.enumerate() {
            let pkg = record.map_err(|e| GotaskError::CatalogLoadError {
                reason: format!("malformed package record #{}: {e}", index + 1),
            })?;
            tracing::trace!(target: "catalog", "Loaded package {}", pkg.import_path);
            packages.insert(pkg.import_path.clone(), pkg);
        }
        Ok(Self {
            packages,
        })
    }

    /// Runs the package lister in `project_dir` and decodes its output.
    ///
    /// # Errors
    ///
    /// Returns [`GotaskError::CatalogLoadError`] if the lister fails or emits
    /// malformed records.
    pub async fn load(toolchain: &dyn Toolchain, project_dir: &Path) -> Result<Self> {
        let listing = toolchain.list_packages(project_dir).await.map_err(|e| {
            GotaskError::CatalogLoadError {
                reason: format!("{e:#}"),
            }
        })?;
        let catalog = Self::from_reader(listing.as_slice())?;
        tracing::debug!(
            target: "catalog",
            "Loaded {} packages from {}",
            catalog.len(),
            project_dir.display()
        );
        Ok(catalog)
    }

    /// Looks up a package by import path.
    #[must_use]
    pub fn get(&self, import_path: &str) -> Option<&PackageInfo> {
        self.packages.get(import_path)
    }

    /// Whether the import path names a package of this project.
    #[must_use]
    pub fn contains(&self, import_path: &str) -> bool {
        self.packages.contains_key(import_path)
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the catalog has no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// All packages, sorted by import path.
    #[must_use]
    pub fn packages(&self) -> Vec<&PackageInfo> {
        let mut all: Vec<_> = self.packages.values().collect();
        all.sort_by(|a, b| a.import_path.cmp(&b.import_path));
        all
    }

    /// Packages that have tests, sorted by import path.
    #[must_use]
    pub fn packages_with_tests(&self) -> Vec<&PackageInfo> {
        self.packages().into_iter().filter(|pkg| pkg.has_test()).collect()
    }

    /// The package whose directory is `dir`.
    #[must_use]
    pub fn find_by_dir(&self, dir: &Path) -> Option<&PackageInfo> {
        self.packages().into_iter().find(|pkg| pkg.is_in_dir(dir))
    }

    /// The package whose directory relative to its root is `rel`.
    #[must_use]
    pub fn find_by_rel_path(&self, rel: &Path) -> Option<&PackageInfo> {
        let rel = crate::utils::normalize_path(rel);
        self.packages().into_iter().find(|pkg| crate::utils::normalize_path(&pkg.rel_path()) == rel)
    }

    /// Resolves a package given either its import path or its relative path.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&PackageInfo> {
        self.get(name).or_else(|| self.find_by_rel_path(Path::new(name)))
    }
}

/// Load-once holder for the shared catalog.
#[derive(Debug, Default)]
pub struct CatalogCell {
    cell: OnceCell<Arc<Catalog>>,
}

impl CatalogCell {
    /// Creates an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cell that is already loaded, bypassing the lister.
    #[must_use]
    pub fn preloaded(catalog: Catalog) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Arc::new(catalog))),
        }
    }

    /// Returns the catalog, loading it on first use.
    ///
    /// Concurrent callers wait for the single in-flight load. A failed load
    /// leaves the cell empty, so the next caller tries again.
    ///
    /// # Errors
    ///
    /// Propagates [`GotaskError::CatalogLoadError`] from [`Catalog::load`].
    pub async fn get_or_load(
        &self,
        toolchain: &dyn Toolchain,
        project_dir: &Path,
    ) -> Result<Arc<Catalog>> {
        self.cell
            .get_or_try_init(|| async {
                Catalog::load(toolchain, project_dir).await.map(Arc::new)
            })
            .await
            .cloned()
    }

    /// The catalog, if it has been loaded.
    #[must_use]
    pub fn get(&self) -> Option<Arc<Catalog>> {
        self.cell.get().cloned()
    }
}
