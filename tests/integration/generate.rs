use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use gotask::catalog::Catalog;
use gotask::constants::{MOCKGEN_MODULE, STRINGER_MODULE};
use gotask::core::GotaskError;
use gotask::manifest::{MockgenManifest, mock_inputs};
use gotask::tasks::{MockgenTask, StringerTask};
use gotask::test_utils::FakeToolchain;
use gotask::test_utils::fixtures::PackageFixture;
use gotask::toolchain::Invocation;

use crate::common::TestProject;

const MANIFEST: &str = "\
example.com/app/store:
  types: [Store]
io:
  external: true
  types:
  - ReaderAt
  - Writer
";

/// `app_with_lib` plus a `store` package and a manifest in `lib` mocking
/// `store` and `io`.
fn mock_project() -> Result<TestProject> {
    let mut project = TestProject::app_with_lib()?;
    project.write("store/store.go", "package store\n");
    project.write("lib/mockgen.yaml", MANIFEST);
    project.add_package(
        PackageFixture::new(project.path(), "store", "example.com/app/store")
            .go_files(&["store.go"]),
    );
    Ok(project)
}

fn mock_toolchain(project: &TestProject) -> FakeToolchain {
    project
        .toolchain()
        .with_package_name("io", "io")
        .with_module_version(MOCKGEN_MODULE, "v1.6.0")
}

fn sorted_runs(fake: &FakeToolchain) -> Vec<Invocation> {
    let mut runs = fake.runs();
    runs.sort_by(|a, b| a.args.cmp(&b.args));
    runs
}

fn destinations(fake: &FakeToolchain) -> Vec<String> {
    sorted_runs(fake).into_iter().filter_map(|run| run.args.get(1).cloned()).collect()
}

#[tokio::test]
async fn test_mockgen_generates_every_entry() -> Result<()> {
    gotask::test_utils::init_test_logging(None);

    let project = mock_project()?;
    let fake = Arc::new(mock_toolchain(&project));
    project.context(fake.clone()).run(&MockgenTask::new("bin/mockgen", "lib")).await?;

    let mockgen = project.file("bin/mockgen").display().to_string();
    let runs = sorted_runs(&fake);
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|run| run.program == mockgen));
    assert_eq!(
        runs[0].args,
        vec![
            "-destination".to_string(),
            project.file("lib/mock_io_test.go").display().to_string(),
            "-package".to_string(),
            "lib_test".to_string(),
            "io".to_string(),
            "ReaderAt,Writer".to_string(),
        ]
    );
    assert_eq!(
        runs[1].args,
        vec![
            "-destination".to_string(),
            project.file("lib/mock_store_test.go").display().to_string(),
            "-package".to_string(),
            "lib".to_string(),
            "example.com/app/store".to_string(),
            "Store".to_string(),
        ]
    );
    assert_eq!(fake.installs().len(), 1, "mockgen installed once for both entries");
    Ok(())
}

#[tokio::test]
async fn test_mockgen_regenerates_only_stale_entries() -> Result<()> {
    let project = mock_project()?;
    let fake = Arc::new(mock_toolchain(&project));
    let task = MockgenTask::new("bin/mockgen", "lib");

    project.context(fake.clone()).run(&task).await?;
    project.context(fake.clone()).run(&task).await?;
    assert_eq!(fake.runs().len(), 2, "second pass finds everything fresh");

    // Local package sources feed only their own mock
    project.touch("store/store.go");
    project.context(fake.clone()).run(&task).await?;
    let runs = fake.runs();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[2].args[1], project.file("lib/mock_store_test.go").display().to_string());

    // The manifest feeds every mock
    project.touch("lib/mockgen.yaml");
    project.context(fake.clone()).run(&task).await?;
    assert_eq!(fake.runs().len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_non_local_package_depends_only_on_manifest() -> Result<()> {
    let project = mock_project()?;
    let fake = Arc::new(mock_toolchain(&project));
    let ctx = project.context(fake);
    let catalog: Arc<Catalog> = ctx.catalog().await?;
    let manifest = MockgenManifest::load(&project.file("lib"))?;

    assert_eq!(
        mock_inputs(&catalog, &manifest.path, "io"),
        vec![project.file("lib/mockgen.yaml")]
    );
    assert_eq!(
        mock_inputs(&catalog, &manifest.path, "example.com/app/store"),
        vec![project.file("lib/mockgen.yaml"), project.file("store/store.go")]
    );
    Ok(())
}

#[tokio::test]
async fn test_one_failed_entry_does_not_stop_the_others() -> Result<()> {
    let project = mock_project()?;
    let fake = Arc::new(mock_toolchain(&project).failing_on("mock_io_test.go"));

    let err = project
        .context(fake.clone())
        .run(&MockgenTask::new("bin/mockgen", "lib"))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err.downcast_ref::<GotaskError>(),
            Some(GotaskError::ExternalProcessError { .. })
        ),
        "{err:#}"
    );
    assert_eq!(destinations(&fake).len(), 2);
    assert!(project.file("lib/mock_store_test.go").is_file());
    assert!(!project.file("lib/mock_io_test.go").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_manifest_is_reported() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain().with_module_version(MOCKGEN_MODULE, "v1.6.0"));

    let err = project
        .context(fake.clone())
        .run(&MockgenTask::new("bin/mockgen", "lib"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GotaskError>(),
        Some(GotaskError::MissingManifest { path, .. }) if path.ends_with("mockgen.yaml")
    ));
    assert!(fake.runs().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_stringer_regenerates_when_inputs_change() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    project.write("lib/color.go", "package lib\n\ntype Color int\n");
    let fake = Arc::new(project.toolchain().with_module_version(STRINGER_MODULE, "v0.20.0"));
    let task = StringerTask::new(
        "bin/stringer",
        "Color",
        "lib/color_string.go",
        vec![PathBuf::from("lib/color.go")],
    );

    project.context(fake.clone()).run(&task).await?;
    project.context(fake.clone()).run(&task).await?;
    assert_eq!(fake.runs().len(), 1);
    assert!(project.file("lib/color_string.go").is_file());
    assert_eq!(fake.runs()[0].args.last(), Some(&project.file("lib").display().to_string()));

    project.touch("lib/color.go");
    project.context(fake.clone()).run(&task).await?;
    assert_eq!(fake.runs().len(), 2);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_generators_from_relative_project_dir() -> Result<()> {
    let project = mock_project()?;
    project.write("lib/color.go", "package lib\n\ntype Color int\n");
    let fake = Arc::new(
        mock_toolchain(&project).with_module_version(STRINGER_MODULE, "v0.20.0"),
    );
    let ctx = project.relative_context(fake.clone());
    assert!(project.relative_path().is_relative());
    assert_eq!(ctx.project_dir(), project.path());

    ctx.run(&MockgenTask::new("bin/mockgen", "lib")).await?;
    assert_eq!(
        destinations(&fake),
        vec![
            project.file("lib/mock_io_test.go").display().to_string(),
            project.file("lib/mock_store_test.go").display().to_string(),
        ]
    );

    let stringer = StringerTask::new(
        "bin/stringer",
        "Color",
        "lib/color_string.go",
        vec![PathBuf::from("lib/color.go")],
    );
    ctx.run(&stringer).await?;
    let runs = fake.runs();
    let last = runs.last().unwrap();
    assert_eq!(last.args[1], project.file("lib/color_string.go").display().to_string());
    assert_eq!(last.args.last(), Some(&project.file("lib").display().to_string()));
    Ok(())
}
