//! Workflow definition file loading
//!
//! Structural checks happen here, before anything executes: the file must
//! exist, be non-empty, carry a `.json` extension, parse as a workflow
//! definition, and pass the uniqueness/non-emptiness checks in
//! [`WorkflowDef::into_workflow`]. Any failure aborts the run with no
//! report written.

use super::{Workflow, WorkflowDef, WorkflowLoadError};
use std::path::Path;

/// Load and validate a workflow definition from `path`
pub fn load_workflow(path: &Path) -> Result<Workflow, WorkflowLoadError> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !is_json {
        return Err(WorkflowLoadError::NotJson {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WorkflowLoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            WorkflowLoadError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if contents.trim().is_empty() {
        return Err(WorkflowLoadError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    let def: WorkflowDef =
        serde_json::from_str(&contents).map_err(|e| WorkflowLoadError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    def.into_workflow()
}
