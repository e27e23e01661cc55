//! CLI command implementations

use super::output::{OutputEvent, OutputHandler};
use crate::config::load_workflow;
use crate::workflow::WorkflowRunner;
use crate::{host, report};
use std::path::Path;

/// Load and run a workflow, then write the run report
///
/// Structural load errors abort before any task executes and before a
/// report is written. Per-task failures do not abort; they surface in the
/// report and in the returned exit code (0 = all tasks succeeded).
pub async fn run_workflow(
    path: &Path,
    threads: usize,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    let workflow = load_workflow(path)
        .map_err(|e| format!("failed to load workflow '{}': {}", path.display(), e))?;

    handler.emit(OutputEvent::RunStart {
        name: workflow.name.clone(),
        stages: workflow.sequence.len(),
        tasks: workflow.tasks.len(),
    });

    let runner = WorkflowRunner::new(threads);
    let summary = runner.run(&workflow, handler).await;

    match report::write_report(&workflow.working_dir, &host::collect(), &summary.results) {
        Ok(report_path) => handler.emit(OutputEvent::ReportWritten { path: report_path }),
        Err(e) => {
            // the run is still complete; recorded outcomes stand
            tracing::error!(
                error = %e,
                dir = %workflow.working_dir.display(),
                "failed to write report"
            );
        }
    }

    handler.emit(OutputEvent::RunComplete {
        success: summary.all_succeeded(),
        duration_ms: summary.duration.as_millis() as u64,
        tasks_run: summary.results.len(),
        tasks_failed: summary.failed_count(),
    });

    Ok(if summary.all_succeeded() { 0 } else { 1 })
}

/// Validate a workflow definition without executing anything
pub fn validate_workflow(path: &Path, handler: &dyn OutputHandler) -> i32 {
    match load_workflow(path) {
        Ok(workflow) => {
            handler.emit(OutputEvent::Info {
                message: format!(
                    "✓ Workflow '{}' is valid ({} tasks, {} stages)",
                    workflow.name,
                    workflow.tasks.len(),
                    workflow.sequence.len()
                ),
            });
            if !workflow.description.is_empty() {
                handler.emit(OutputEvent::Info {
                    message: format!("  {}", workflow.description),
                });
            }
            0
        }
        Err(e) => {
            handler.emit(OutputEvent::RunError {
                error: format!("workflow validation failed: {}", e),
            });
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::output::QuietHandler;
    use tempfile::TempDir;

    fn write_workflow(dir: &TempDir, tasks_json: &str, sequence_json: &str) -> std::path::PathBuf {
        let path = dir.path().join("wf.json");
        let json = format!(
            r#"{{
                "name": "demo",
                "working_directory": "{}",
                "variables": [],
                "tasks": {},
                "run_sequence": {}
            }}"#,
            dir.path().display(),
            tasks_json,
            sequence_json
        );
        std::fs::write(&path, json).unwrap();
        path
    }

    #[tokio::test]
    async fn run_writes_report_and_returns_zero_on_success() {
        let dir = TempDir::new().unwrap();
        let path = write_workflow(&dir, r#"[{"id": "a", "command": "echo hi"}]"#, r#"["a"]"#);

        let code = run_workflow(&path, 1, &QuietHandler).await.unwrap();

        assert_eq!(code, 0);
        let report = std::fs::read_to_string(dir.path().join("report.csv")).unwrap();
        assert!(report.contains("TASK_ID,COMMAND,OUTPUT,ERROR,SUCCESSFUL"));
        assert!(report.contains("a,echo hi,,,1"));
    }

    #[tokio::test]
    async fn run_returns_one_when_a_task_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_workflow(
            &dir,
            r#"[{"id": "a", "command": "echo hi"}, {"id": "b", "command": "false"}]"#,
            r#"["a", "b"]"#,
        );

        let code = run_workflow(&path, 1, &QuietHandler).await.unwrap();

        assert_eq!(code, 1);
        let report = std::fs::read_to_string(dir.path().join("report.csv")).unwrap();
        assert!(report.contains("b,false,,command exited with code 1,0"));
    }

    #[tokio::test]
    async fn structural_error_aborts_without_a_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let result = run_workflow(&path, 1, &QuietHandler).await;

        assert!(result.is_err());
        assert!(!dir.path().join("report.csv").exists());
    }

    #[tokio::test]
    async fn validate_accepts_a_good_workflow_without_running_it() {
        let dir = TempDir::new().unwrap();
        let path = write_workflow(
            &dir,
            r#"[{"id": "a", "command": "touch should-not-exist.txt"}]"#,
            r#"["a"]"#,
        );

        let code = validate_workflow(&path, &QuietHandler);

        assert_eq!(code, 0);
        assert!(!dir.path().join("should-not-exist.txt").exists());
        assert!(!dir.path().join("report.csv").exists());
    }

    #[tokio::test]
    async fn validate_rejects_duplicate_task_ids() {
        let dir = TempDir::new().unwrap();
        let path = write_workflow(
            &dir,
            r#"[{"id": "a", "command": "echo 1"}, {"id": "a", "command": "echo 2"}]"#,
            r#"["a"]"#,
        );

        assert_eq!(validate_workflow(&path, &QuietHandler), 1);
    }
}
