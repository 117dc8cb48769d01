use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use gotask::catalog::Catalog;
use gotask::graph::{source_dependencies, test_dependencies};
use gotask::test_utils::fixtures::PackageFixture;

use crate::common::TestProject;

#[tokio::test]
async fn test_load_and_flatten_project() -> Result<()> {
    gotask::test_utils::init_test_logging(None);

    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain());
    let ctx = project.context(fake.clone());

    let catalog = ctx.catalog().await?;
    assert_eq!(catalog.len(), 2);
    assert_eq!(ctx.base_package()?, "example.com/app");

    assert_eq!(
        source_dependencies(&catalog, "example.com/app"),
        vec![project.file("main.go"), project.file("lib/lib.go")]
    );
    assert_eq!(
        test_dependencies(&catalog, "example.com/app/lib"),
        vec![project.file("lib/lib_test.go"), project.file("lib/lib.go")]
    );
    Ok(())
}

#[tokio::test]
async fn test_catalog_is_listed_once_per_context() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain());
    let ctx = project.context(fake.clone());

    let (a, b, c) = tokio::join!(ctx.catalog(), ctx.catalog(), ctx.catalog());
    assert!(Arc::ptr_eq(&a?, &b?));
    c?;
    assert_eq!(fake.listing_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_resolve_by_relative_path() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let ctx = project.context(Arc::new(project.toolchain()));
    let catalog = ctx.catalog().await?;

    let lib = catalog.resolve("lib").expect("lib resolves by directory");
    assert_eq!(lib.import_path, "example.com/app/lib");
    assert_eq!(lib.test_binary(), project.file("lib/lib.test"));
    assert!(catalog.resolve("example.com/missing").is_none());
    Ok(())
}

#[tokio::test]
async fn test_embedded_files_and_transitive_imports() -> Result<()> {
    let mut project = TestProject::app_with_lib()?;
    project.write("web/web.go", "package web\n");
    project.write("web/index.html", "<html></html>\n");
    project.add_package(
        PackageFixture::new(project.path(), "web", "example.com/app/web")
            .go_files(&["web.go"])
            .embed_files(&["index.html"])
            .imports(&["embed", "example.com/app/lib"]),
    );
    let root = PackageFixture::new(project.path(), ".", "example.com/app")
        .name("main")
        .go_files(&["main.go"])
        .imports(&["example.com/app/web", "example.com/app/lib"]);
    project.add_package(root);

    let ctx = project.context(Arc::new(project.toolchain()));
    let catalog = ctx.catalog().await?;

    let deps = source_dependencies(&catalog, "example.com/app");
    assert_eq!(
        deps,
        vec![
            project.file("main.go"),
            project.file("web/web.go"),
            project.file("web/index.html"),
            project.file("lib/lib.go"),
        ]
    );
    Ok(())
}

#[test]
fn test_scenario_imports_outside_catalog_are_skipped() {
    let catalog = Catalog::from_reader(
        &br#"
        {"Dir": "/p/app", "ImportPath": "app", "GoFiles": ["main.go"], "Imports": ["lib", "os"]}
        {"Dir": "/p/lib", "ImportPath": "lib", "GoFiles": ["lib.go"]}
        "#[..],
    )
    .unwrap();

    assert_eq!(
        source_dependencies(&catalog, "app"),
        vec![PathBuf::from("/p/app/main.go"), PathBuf::from("/p/lib/lib.go")]
    );
}

#[test]
fn test_malformed_listing_is_rejected() {
    let err = Catalog::from_reader(&br#"{"Dir": "/p", "ImportPath": "#[..]).unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<gotask::core::GotaskError>(),
            Some(gotask::core::GotaskError::CatalogLoadError { .. })
        ),
        "{err:#}"
    );
}
