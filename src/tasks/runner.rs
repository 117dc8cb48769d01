//! Memoized task execution.

use anyhow::Result;
use dashmap::DashMap;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{BuildContext, Task};
use crate::core::GotaskError;

/// Shared result slot for one task id.
type TaskSlot = Arc<OnceCell<Result<(), GotaskError>>>;

/// Where a task id stands in a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Scheduled and still running
    Running,
    /// Finished successfully
    Done,
    /// Finished with this error
    Failed(String),
}

/// Runs each task id at most once and shares the outcome.
///
/// The first caller for an id executes the task; concurrent callers for the
/// same id wait on the same slot, and later callers read the stored result. A
/// failure is stored too, so every dependent of a failed task sees the same
/// error and the task is not retried.
///
/// Task ids must not form a cycle: a task that (transitively) depends on its
/// own id waits on itself forever.
#[derive(Debug, Default)]
pub struct TaskRunner {
    /// Result slot per task id.
    ///
    /// The map guard is dropped as soon as the slot is cloned out, so no map
    /// lock is held across an await.
    slots: DashMap<String, TaskSlot>,
}

impl TaskRunner {
    /// Creates an empty runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: &str) -> TaskSlot {
        Arc::clone(self.slots.entry(id.to_string()).or_default().value())
    }

    /// Runs `task` unless a task with the same id already ran (or is running).
    ///
    /// # Errors
    ///
    /// Returns the task's error, as recorded the first time it ran.
    pub async fn run(&self, ctx: &BuildContext, task: &dyn Task) -> Result<()> {
        let id = task.id();
        let slot = self.slot(&id);

        let outcome = slot
            .get_or_init(|| async {
                tracing::debug!(target: "tasks", "Running {} ({})", task.name(), id);
                let result = task.run(ctx).await.map_err(|e| GotaskError::from_anyhow(&e));
                if let Err(e) = &result {
                    tracing::debug!(target: "tasks", "{} failed: {}", task.name(), e);
                }
                result
            })
            .await;

        outcome.clone().map_err(anyhow::Error::from)
    }

    /// Runs `tasks` concurrently and waits for all of them.
    ///
    /// Every task runs to completion even when another fails.
    ///
    /// # Errors
    ///
    /// Returns the first failure in `tasks` order.
    pub async fn run_all(&self, ctx: &BuildContext, tasks: &[Box<dyn Task>]) -> Result<()> {
        let results = join_all(tasks.iter().map(|task| self.run(ctx, task.as_ref()))).await;
        results.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    /// Status of `id`, or `None` if it was never scheduled.
    #[must_use]
    pub fn status(&self, id: &str) -> Option<TaskStatus> {
        let slot = Arc::clone(self.slots.get(id)?.value());
        Some(match slot.get() {
            None => TaskStatus::Running,
            Some(Ok(())) => TaskStatus::Done,
            Some(Err(e)) => TaskStatus::Failed(e.to_string()),
        })
    }

    /// Number of distinct ids scheduled so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing has been scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
