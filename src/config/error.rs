//! Structural errors for workflow definition loading
//!
//! Everything in here is fatal to the run: the workflow never starts and no
//! report is written. Per-task failures are not errors in this sense; they
//! live as entries inside a `TaskResult`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading and validating a workflow definition file
#[derive(Debug, Error)]
pub enum WorkflowLoadError {
    #[error("workflow file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read workflow file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("workflow file must have a .json extension: {path}")]
    NotJson { path: PathBuf },

    #[error("workflow file is empty: {path}")]
    EmptyFile { path: PathBuf },

    #[error("failed to parse workflow file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("duplicate task id '{id}' in workflow definition")]
    DuplicateTaskId { id: String },

    #[error("duplicate variable key '{key}' in workflow definition")]
    DuplicateVariable { key: String },

    #[error("task with empty id in workflow definition")]
    EmptyTaskId,

    #[error("workflow defines no tasks")]
    NoTasks,

    #[error("workflow defines no run sequence")]
    NoSequence,
}
