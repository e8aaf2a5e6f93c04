use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Why a single model or fan-out sub-task did not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The call exceeded its own tier timeout.
    Timeout,
    /// Still pending at the fan-out deadline; aborted, result discarded.
    Cancelled,
    /// Network or provider error.
    Transport,
    /// The model answered, but not with the requested shape.
    InvalidOutput,
    /// The worker task panicked.
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Timeout => "timed out",
            FailureKind::Cancelled => "cancelled (not ready before deadline)",
            FailureKind::Transport => "transport error",
            FailureKind::InvalidOutput => "invalid output",
            FailureKind::Panicked => "worker panicked",
        };
        f.write_str(s)
    }
}

/// Failure of one named sub-task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: String,
    pub kind: FailureKind,
    pub detail: String,
}

impl TaskFailure {
    pub fn new(task: impl Into<String>, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            kind,
            detail: detail.into(),
        }
    }

    pub fn timeout(task: impl Into<String>, after: Duration) -> Self {
        Self::new(task, FailureKind::Timeout, format!("after {}s", after.as_secs()))
    }

    pub fn cancelled(task: impl Into<String>, deadline: Duration) -> Self {
        Self::new(
            task,
            FailureKind::Cancelled,
            format!("fan-out deadline of {}s reached", deadline.as_secs()),
        )
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}: {}", self.task, self.kind)
        } else {
            write!(f, "{}: {} ({})", self.task, self.kind, self.detail)
        }
    }
}

impl std::error::Error for TaskFailure {}

/// Result of one Model Gateway call or fan-out sub-task.
pub type TaskResult<T> = Result<T, TaskFailure>;

/// Errors surfaced at the lookup boundary.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Malformed request or out-of-range index. The message names the
    /// accepted values.
    #[error("{0}")]
    Validation(String),

    /// The dictionary API failed and this path has no fallback.
    #[error("Dictionary API failed: {0}")]
    SourceUnavailable(String),

    /// A single required model call failed.
    #[error("Model task failed: {0}")]
    ModelTask(TaskFailure),

    /// Several required sub-tasks failed; every one is listed.
    #[error("{} sub-task(s) failed: {}", .0.len(), join_failures(.0))]
    Aggregate(Vec<TaskFailure>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LookupError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LookupError::Validation(msg.into())
    }

    /// Collapse a list of failures: one failure stays a `ModelTask`, more
    /// become an `Aggregate`.
    pub fn from_failures(mut failures: Vec<TaskFailure>) -> Self {
        if failures.len() == 1 {
            LookupError::ModelTask(failures.remove(0))
        } else {
            LookupError::Aggregate(failures)
        }
    }
}

fn join_failures(failures: &[TaskFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
