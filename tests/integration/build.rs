use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use gotask::constants::GINKGO_MODULE;
use gotask::core::GotaskError;
use gotask::tasks::{
    AllTestBuildTask, AllTestRunTask, BuildTask, Task, TaskStatus, TestBuildTask, TestDriver,
    TestRunTask,
};

use crate::common::TestProject;

#[tokio::test]
async fn test_build_runs_once_then_skips_when_fresh() -> Result<()> {
    gotask::test_utils::init_test_logging(None);

    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain());

    project.context(fake.clone()).run(&BuildTask::new("bin/app")).await?;
    let runs = fake.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].program, "go");
    assert_eq!(
        runs[0].args,
        vec![
            "build".to_string(),
            "-o".to_string(),
            project.file("bin/app").display().to_string(),
            "example.com/app".to_string(),
        ]
    );
    assert_eq!(runs[0].current_dir.as_deref(), Some(project.path()));
    assert!(project.file("bin/app").is_file());

    // A new pass with nothing changed does nothing
    project.context(fake.clone()).run(&BuildTask::new("bin/app")).await?;
    assert_eq!(fake.runs().len(), 1);

    // Touching a transitive dependency rebuilds
    project.touch("lib/lib.go");
    project.context(fake.clone()).run(&BuildTask::new("bin/app")).await?;
    assert_eq!(fake.runs().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_build_tags_reach_command_and_id() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain());
    let ctx = project.context(fake.clone());

    let task = BuildTask::new("bin/app").tags(vec!["netgo".to_string()]);
    ctx.run(&task).await?;

    assert_eq!(ctx.runner().status("build bin/app[netgo]"), Some(TaskStatus::Done));
    assert!(fake.runs()[0].args.windows(2).any(|w| w[0] == "-tags" && w[1] == "netgo"));
    Ok(())
}

#[tokio::test]
async fn test_shared_prerequisite_runs_once() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain().with_run_delay(Duration::from_millis(20)));
    let ctx = project.context(fake.clone());

    let tasks: Vec<Box<dyn Task>> = vec![
        Box::new(TestRunTask::new("example.com/app/lib")),
        Box::new(TestBuildTask::new("example.com/app/lib")),
        Box::new(AllTestBuildTask::new()),
    ];
    ctx.run_deps(tasks).await?;

    let builds: Vec<_> =
        fake.runs().into_iter().filter(|run| run.args.iter().any(|a| a == "-c")).collect();
    assert_eq!(builds.len(), 1, "test binary built once");
    assert_eq!(fake.listing_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_all_tests_build_before_running() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain());
    let ctx = project.context(fake.clone());

    ctx.run(&AllTestRunTask::new()).await?;

    let runs = fake.runs();
    assert_eq!(runs.len(), 2);
    assert_eq!(
        runs[0].args,
        vec![
            "test".to_string(),
            "-c".to_string(),
            "-o".to_string(),
            project.file("lib/lib.test").display().to_string(),
            "example.com/app/lib".to_string(),
        ]
    );
    assert_eq!(runs[1].args, vec!["test", "-timeout", "10s", "example.com/app/lib"]);
    Ok(())
}

#[tokio::test]
async fn test_test_binary_rebuilds_when_test_file_changes() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain());

    project.context(fake.clone()).run(&TestBuildTask::new("lib")).await?;
    project.context(fake.clone()).run(&TestBuildTask::new("lib")).await?;
    assert_eq!(fake.runs().len(), 1);

    // The main package's sources are not inputs of the lib test binary
    project.touch("main.go");
    project.context(fake.clone()).run(&TestBuildTask::new("lib")).await?;
    assert_eq!(fake.runs().len(), 1);

    project.touch("lib/lib_test.go");
    project.context(fake.clone()).run(&TestBuildTask::new("lib")).await?;
    assert_eq!(fake.runs().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_unknown_package_is_not_found() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let ctx = project.context(Arc::new(project.toolchain()));

    let err = ctx.run(&TestBuildTask::new("example.com/nope")).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GotaskError>(),
        Some(GotaskError::PackageNotFound { name }) if name == "example.com/nope"
    ));
    Ok(())
}

#[tokio::test]
async fn test_failed_build_is_reported_to_every_dependent() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain().failing_on("-c"));
    let ctx = project.context(fake.clone());

    let err = ctx.run(&TestRunTask::new("example.com/app/lib")).await.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<GotaskError>(),
            Some(GotaskError::ExternalProcessError { .. })
        ),
        "{err:#}"
    );
    assert!(matches!(
        ctx.runner().status("build-test-example.com/app/lib"),
        Some(TaskStatus::Failed(_))
    ));

    // Asking again reuses the recorded failure instead of rebuilding
    let again = ctx.run(&TestBuildTask::new("example.com/app/lib")).await;
    assert!(again.is_err());
    assert_eq!(fake.runs().len(), 1);
    assert!(!project.file("lib/lib.test").exists());
    Ok(())
}

#[tokio::test]
async fn test_ginkgo_driver_installs_and_runs_in_parallel() -> Result<()> {
    let project = TestProject::app_with_lib()?;
    let fake = Arc::new(project.toolchain().with_module_version(GINKGO_MODULE, "v2.17.1"));
    let ctx = project.context(fake.clone());

    let driver = TestDriver::Ginkgo {
        bin: "bin/ginkgo".into(),
    };
    ctx.run(&AllTestRunTask::new().driver(driver)).await?;

    assert_eq!(fake.installs().len(), 1);
    let ginkgo = project.file("bin/ginkgo").display().to_string();
    let runs = fake.runs();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].program, ginkgo);
    assert_eq!(
        runs[0].args,
        vec![
            "build".to_string(),
            "-o".to_string(),
            project.file("lib/lib.test").display().to_string(),
            "./lib".to_string(),
        ]
    );
    assert_eq!(runs[1].program, ginkgo);
    assert_eq!(
        runs[1].args,
        vec![
            "run".to_string(),
            "-p".to_string(),
            "--timeout".to_string(),
            "10s".to_string(),
            project.file("lib/lib.test").display().to_string(),
        ]
    );
    Ok(())
}
