use anyhow::Result;
use std::sync::Arc;

use gotask::config::{ExcludedModule, InstallPolicy, Settings};
use gotask::constants::{GOLANGCI_LINT_MODULE, REVIVE_MODULE, STRINGER_MODULE};
use gotask::core::GotaskError;
use gotask::installer::{InstallOutcome, ensure_installed};
use gotask::tasks::{BuildContext, InstallTask, ReviveTask, StringerTask, Task};
use gotask::test_utils::{FakeToolchain, ToolCall};

use crate::common::TestProject;

#[tokio::test]
async fn test_matching_version_skips_install() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let bin = temp.path().join("bin/stringer");
    let fake = FakeToolchain::new()
        .with_module_version(STRINGER_MODULE, "v0.20.0")
        .with_binary_version(&bin, "v0.20.0");

    let outcome =
        ensure_installed(&fake, &InstallPolicy::default(), &bin, STRINGER_MODULE, None).await?;

    assert_eq!(
        outcome,
        InstallOutcome::UpToDate {
            version: "v0.20.0".to_string()
        }
    );
    assert!(fake.installs().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_pin_change_reinstalls_once() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let bin = temp.path().join("bin/stringer");
    let fake = FakeToolchain::new()
        .with_module_version(STRINGER_MODULE, "v0.21.0")
        .with_binary_version(&bin, "v0.20.0");

    let first =
        ensure_installed(&fake, &InstallPolicy::default(), &bin, STRINGER_MODULE, None).await?;
    let second =
        ensure_installed(&fake, &InstallPolicy::default(), &bin, STRINGER_MODULE, None).await?;

    assert!(matches!(
        first,
        InstallOutcome::Installed { previous: Some(ref v), .. } if v == "v0.20.0"
    ));
    assert!(matches!(second, InstallOutcome::UpToDate { .. }));
    assert_eq!(fake.installs().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_golangci_lint_is_rejected_by_default() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain());
    let ctx = project.context(fake.clone());

    let err =
        ctx.run(&InstallTask::new("bin/golangci-lint", GOLANGCI_LINT_MODULE)).await.unwrap_err();
    match err.downcast_ref::<GotaskError>() {
        Some(GotaskError::ConfigurationRejection {
            module,
            reason,
        }) => {
            assert_eq!(module, GOLANGCI_LINT_MODULE);
            assert!(reason.contains("go install"), "{reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(fake.calls().is_empty(), "rejected before touching the toolchain");
    Ok(())
}

#[tokio::test]
async fn test_configured_exclusions_replace_defaults() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(
        project
            .toolchain()
            .with_module_version(GOLANGCI_LINT_MODULE, "v1.59.1")
            .with_module_version(REVIVE_MODULE, "v1.3.7"),
    );
    let settings = Settings {
        install: InstallPolicy {
            excluded: vec![ExcludedModule {
                module: REVIVE_MODULE.to_string(),
                reason: "pinned by the CI image".to_string(),
            }],
        },
        ..Settings::default()
    };
    let ctx = BuildContext::new(project.path(), settings, fake.clone());

    ctx.run(&InstallTask::new("bin/golangci-lint", GOLANGCI_LINT_MODULE)).await?;
    let err = ctx.run(&ReviveTask::new("bin/revive", "revive.toml")).await.unwrap_err();
    assert!(err.to_string().contains("pinned by the CI image"), "{err:#}");
    assert_eq!(fake.installs().len(), 1);
    assert!(fake.runs().is_empty(), "lint never ran without its tool");
    Ok(())
}

#[tokio::test]
async fn test_generators_share_one_install_per_binary() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    project.write("lib/color.go", "package lib\n");
    project.write("lib/shade.go", "package lib\n");
    let fake = Arc::new(project.toolchain().with_module_version(STRINGER_MODULE, "v0.20.0"));
    let ctx = project.context(fake.clone());

    let tasks: Vec<Box<dyn Task>> = vec![
        Box::new(StringerTask::new(
            "bin/stringer",
            "Color",
            "lib/color_string.go",
            vec!["lib/color.go".into()],
        )),
        Box::new(StringerTask::new(
            "bin/stringer",
            "Shade",
            "lib/shade_string.go",
            vec!["lib/shade.go".into()],
        )),
    ];
    ctx.run_deps(tasks).await?;

    assert_eq!(
        fake.installs(),
        vec![ToolCall::Install {
            mod_dir: Some(project.path().to_path_buf()),
            module: STRINGER_MODULE.to_string(),
            gobin: project.file("bin"),
        }]
    );
    assert_eq!(fake.runs().len(), 2);
    Ok(())
}
