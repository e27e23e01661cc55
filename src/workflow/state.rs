//! Task results and run state

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Outcome of a single task execution attempt
///
/// Immutable once built. Success is derived: a result succeeded iff no
/// errors were recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    /// Id the sequence token resolved to (verbatim for unknown ids)
    pub task_id: String,

    /// Command as resolved for execution; raw command text when
    /// resolution itself failed
    pub command: String,

    /// Captured standard output; empty for failed tasks
    pub stdout: String,

    /// Human-readable failure messages, in the order they occurred
    pub errors: Vec<String>,
}

impl TaskResult {
    pub fn success(task_id: impl Into<String>, command: impl Into<String>, stdout: String) -> Self {
        Self {
            task_id: task_id.into(),
            command: command.into(),
            stdout,
            errors: Vec::new(),
        }
    }

    pub fn failure(
        task_id: impl Into<String>,
        command: impl Into<String>,
        errors: Vec<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            command: command.into(),
            stdout: String::new(),
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Thread-safe, append-only sink of task results
///
/// The only structure mutated concurrently during a run. Results land in
/// completion order within a stage; the runner's stage barrier keeps
/// results of different stages from interleaving.
#[derive(Debug, Clone, Default)]
pub struct ResultSink {
    results: Arc<Mutex<Vec<TaskResult>>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: TaskResult) {
        self.lock().push(result);
    }

    /// Copy of the aggregated results, in aggregation order
    pub fn snapshot(&self) -> Vec<TaskResult> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TaskResult>> {
        // appends are atomic, so the list stays consistent even if a
        // holder panicked
        self.results.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Aggregate outcome of one workflow run
#[derive(Debug)]
pub struct RunSummary {
    pub results: Vec<TaskResult>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(TaskResult::is_success)
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}
