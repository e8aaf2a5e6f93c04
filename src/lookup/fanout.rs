use std::future::Future;
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

use crate::error::{FailureKind, TaskFailure, TaskResult};

/// Tasks spawned for one orchestration call, sharing one deadline.
/// Dropping the scope aborts anything still running, so no task outlives
/// the request that created it.
pub(crate) struct TaskScope {
    deadline: Instant,
    budget: Duration,
    handles: Vec<AbortHandle>,
}

/// A spawned sub-task awaiting collection.
pub(crate) struct Pending<T> {
    task: String,
    handle: JoinHandle<TaskResult<T>>,
}

impl TaskScope {
    pub(crate) fn with_deadline(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
            budget,
            handles: Vec::new(),
        }
    }

    pub(crate) fn spawn<T, F>(&mut self, task: impl Into<String>, fut: F) -> Pending<T>
    where
        T: Send + 'static,
        F: Future<Output = TaskResult<T>> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        self.handles.push(handle.abort_handle());
        Pending {
            task: task.into(),
            handle,
        }
    }

    /// Wait for one task until the shared deadline. A task still pending at
    /// the deadline is aborted and reported as cancelled.
    pub(crate) async fn join<T>(&self, pending: Pending<T>) -> TaskResult<T> {
        let Pending { task, mut handle } = pending;
        match tokio::time::timeout_at(self.deadline, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) if e.is_cancelled() => Err(TaskFailure::cancelled(task, self.budget)),
            Ok(Err(e)) => {
                tracing::error!("Task {task} panicked: {e}");
                Err(TaskFailure::new(task, FailureKind::Panicked, e.to_string()))
            }
            Err(_) => {
                handle.abort();
                tracing::warn!("Task {task} not ready at the {}s deadline, cancelled", self.budget.as_secs());
                Err(TaskFailure::cancelled(task, self.budget))
            }
        }
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
