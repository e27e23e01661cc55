//! Workflow definition types

use super::WorkflowLoadError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A workflow-level variable declaration
///
/// The value may be a literal, or reference an environment variable with a
/// `{{NAME}}` placeholder resolved before execution.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VariableDef {
    pub key: String,
    pub value: String,
}

/// A single named task
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskCommand {
    /// Task id (unique within the workflow)
    pub id: String,

    /// Raw command text, possibly containing `${name}` placeholders
    pub command: String,
}

/// Workflow definition as parsed from the JSON file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowDef {
    /// Workflow name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Directory tasks run in; falls back to the current directory when
    /// unset or non-existent
    #[serde(default)]
    pub working_directory: String,

    /// Workflow-level variables
    #[serde(default)]
    pub variables: Vec<VariableDef>,

    /// Tasks addressable from the run sequence
    #[serde(default)]
    pub tasks: Vec<TaskCommand>,

    /// Ordered stage tokens: a task id, or a comma-joined group of ids
    /// that run concurrently
    #[serde(default)]
    pub run_sequence: Vec<String>,
}

/// Validated workflow, ready for execution
///
/// Tasks and variables are indexed by key; duplicates have been rejected
/// at load time and the working directory has been resolved.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub name: String,
    pub description: String,
    pub working_dir: PathBuf,
    pub variables: HashMap<String, String>,
    pub tasks: HashMap<String, String>,
    pub sequence: Vec<String>,
}

impl WorkflowDef {
    /// Validate the definition and index tasks/variables by key
    ///
    /// Duplicate task ids and duplicate variable keys are structural
    /// errors, as are empty `tasks` or `run_sequence` lists. The working
    /// directory is tilde-expanded and replaced by the current directory
    /// when it does not exist.
    pub fn into_workflow(self) -> Result<Workflow, WorkflowLoadError> {
        if self.tasks.is_empty() {
            return Err(WorkflowLoadError::NoTasks);
        }
        if self.run_sequence.is_empty() {
            return Err(WorkflowLoadError::NoSequence);
        }

        let mut tasks = HashMap::with_capacity(self.tasks.len());
        for task in self.tasks {
            if task.id.trim().is_empty() {
                return Err(WorkflowLoadError::EmptyTaskId);
            }
            if tasks.insert(task.id.clone(), task.command).is_some() {
                return Err(WorkflowLoadError::DuplicateTaskId { id: task.id });
            }
        }

        let mut variables = HashMap::with_capacity(self.variables.len());
        for var in self.variables {
            if variables.insert(var.key.clone(), var.value).is_some() {
                return Err(WorkflowLoadError::DuplicateVariable { key: var.key });
            }
        }

        Ok(Workflow {
            name: self.name,
            description: self.description,
            working_dir: resolve_working_dir(&self.working_directory),
            variables,
            tasks,
            sequence: self.run_sequence,
        })
    }
}

/// Expand and check the configured working directory, falling back to the
/// current process directory when it is unset or does not exist.
fn resolve_working_dir(configured: &str) -> PathBuf {
    let expanded = shellexpand::tilde(configured);
    let path = PathBuf::from(expanded.as_ref());
    if !configured.trim().is_empty() && path.is_dir() {
        path
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}
