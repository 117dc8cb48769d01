//! Transitive dependency flattening over the package catalog
//!
//! Answers "which files does building this target depend on" by walking the
//! import graph breadth-first from a root package. What counts as a package's
//! files and imports is supplied by the caller, so the same walk serves
//! ordinary builds (sources and imports) and test builds (test files at the
//! root, sources below it).
//!
//! Imports that are not in the catalog (standard library, third-party
//! modules) are skipped without error: only project files participate in
//! freshness decisions.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use crate::catalog::{Catalog, PackageInfo};

/// Flattens every file reachable from `root` into one list.
///
/// A FIFO worklist seeded with `root` is drained; each import path is visited
/// at most once. A visited package missing from the catalog contributes
/// nothing. The result is in breadth-first insertion order and contains no
/// duplicate paths. An unknown `root` yields an empty list.
///
/// # Examples
///
/// ```rust
/// use gotask::catalog::Catalog;
/// use gotask::graph::flatten;
///
/// let catalog = Catalog::from_reader(&br#"
///   {"Dir": "/a", "ImportPath": "a", "GoFiles": ["a.go"], "Imports": ["b", "fmt"]}
///   {"Dir": "/b", "ImportPath": "b", "GoFiles": ["b.go"]}
/// "#[..]).unwrap();
///
/// let files = flatten(&catalog, "a", |p| p.source_files(), |p| p.source_import_packages());
/// assert_eq!(files.len(), 2);
/// ```
pub fn flatten<F, I>(catalog: &Catalog, root: &str, files_of: F, imports_of: I) -> Vec<PathBuf>
where
    F: Fn(&PackageInfo) -> Vec<PathBuf>,
    I: Fn(&PackageInfo) -> Vec<String>,
{
    let mut queue = VecDeque::from([root.to_string()]);
    let mut visited: HashSet<String> = HashSet::new();
    let mut seen_files: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();

    while let Some(import_path) = queue.pop_front() {
        if !visited.insert(import_path.clone()) {
            continue;
        }
        let Some(pkg) = catalog.get(&import_path) else {
            continue;
        };

        for file in files_of(pkg) {
            if seen_files.insert(file.clone()) {
                files.push(file);
            }
        }
        queue.extend(imports_of(pkg).into_iter().filter(|dep| !visited.contains(dep)));
    }

    tracing::trace!(
        target: "graph",
        "Flattened {} files from {} packages rooted at {}",
        files.len(),
        visited.len(),
        root
    );
    files
}

/// Files an ordinary build of `root` depends on.
#[must_use]
pub fn source_dependencies(catalog: &Catalog, root: &str) -> Vec<PathBuf> {
    flatten(catalog, root, PackageInfo::source_files, PackageInfo::source_import_packages)
}

/// Files the test binary of `root` depends on.
///
/// The root contributes its sources and test files and follows both import
/// lists. Packages below the root contribute only their ordinary sources,
/// since their tests are not linked into this binary.
#[must_use]
pub fn test_dependencies(catalog: &Catalog, root: &str) -> Vec<PathBuf> {
    let Some(root_pkg) = catalog.get(root) else {
        return Vec::new();
    };

    let mut files = root_pkg.test_files();
    let mut seen: HashSet<PathBuf> = files.iter().cloned().collect();
    // The root's xtest package imports the root itself, which pulls its sources
    // in through the ordinary walk.
    let mut roots: Vec<String> = vec![root.to_string()];
    roots.extend(root_pkg.test_import_packages());

    let mut visited = HashSet::new();
    for start in roots {
        if !visited.insert(start.clone()) {
            continue;
        }
        for file in source_dependencies(catalog, &start) {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }
    files
}
