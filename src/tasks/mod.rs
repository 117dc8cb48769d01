//! Build tasks: named, idempotent units of work
//!
//! Every task implements [`Task`]: a stable [`id`](Task::id), a display
//! [`name`](Task::name), and [`run`](Task::run). Tasks never call each other
//! directly; they hand their prerequisites to the [`TaskRunner`] through
//! [`BuildContext::run_deps`], which runs each distinct id at most once and
//! runs independent prerequisites concurrently.
//!
//! A task's `run` follows the same shape throughout:
//!
//! 1. Declare prerequisites (catalog load, tool installs, other builds)
//! 2. Work out the output and the files it depends on
//! 3. Ask the freshness oracle whether the output is stale
//! 4. If so, run exactly one external command and surface its exit status
//!
//! # Task Variants
//!
//! | Task | Id | Command |
//! |------|----|---------|
//! | [`BuildTask`] | `build <exe>` | `go build -o <exe> [-tags] <pkg>` |
//! | [`TestBuildTask`] | `build-test-<pkg>` | `go test -c -o <bin> [-v] [-tags] <pkg>` |
//! | [`AllTestBuildTask`] | `build-all-tests` | one [`TestBuildTask`] per tested package |
//! | [`TestRunTask`] | `run-test-<pkg>` | `go test -timeout 10s [-v] [-tags] <pkg>` |
//! | [`AllTestRunTask`] | `run-all-tests` | one [`TestRunTask`] per tested package |
//! | [`InstallTask`] | `install <bin>` | `go install <module>` |
//! | [`MockgenTask`] | `mockgen <dir>` | `mockgen -destination ... <import> <types>` |
//! | [`StringerTask`] | `stringer <dest>` | `stringer -output <dest> -type <T> <dir>` |
//! | [`ReviveTask`] | `revive <bin>` | `revive -formatter unix ... ./...` |
//!
//! Build tags are part of the id of every tag-aware task, so the same package
//! built with different tags is two different tasks.

mod build;
mod context;
mod install;
mod mockgen;
mod revive;
mod runner;
mod stringer;

pub use build::BuildTask;
pub use context::BuildContext;
pub use install::InstallTask;
pub use mockgen::MockgenTask;
pub use revive::ReviveTask;
pub use runner::{TaskRunner, TaskStatus};
pub use stringer::StringerTask;
pub use test::{AllTestBuildTask, AllTestRunTask, TestBuildTask, TestDriver, TestRunTask};

use anyhow::Result;
use futures::future::BoxFuture;

/// A named, idempotent unit of work.
///
/// Two tasks with equal [`id`](Self::id) are interchangeable: the runner
/// executes only the first one it sees. The id must therefore be a pure
/// function of the task's configuration.
pub trait Task: Send + Sync {
    /// Stable identity used for deduplication.
    fn id(&self) -> String;

    /// Human-readable name for logs.
    fn name(&self) -> String;

    /// Performs the work. Called at most once per runner.
    fn run<'a>(&'a self, ctx: &'a BuildContext) -> BoxFuture<'a, Result<()>>;
}

/// Command-line options for build tags; empty when there are none.
///
/// `go` spells the option `-tags`, ginkgo `--tags`.
pub(crate) fn format_tags(option: &str, tags: &[String]) -> Vec<String> {
    if tags.is_empty() { Vec::new() } else { vec![option.to_string(), tags.join(",")] }
}

/// Appends build tags to a task id.
pub(crate) fn tagged_id(base: String, tags: &[String]) -> String {
    if tags.is_empty() { base } else { format!("{base}[{}]", tags.join(",")) }
}
