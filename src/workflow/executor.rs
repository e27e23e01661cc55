//! Single task execution
//!
//! Takes a task id and its raw command, resolves placeholders, and runs the
//! command as a child process in the workflow working directory. Every
//! failure mode lands inside the returned `TaskResult`; this function never
//! errors past the task boundary.

use super::resolver::{ResolvedVariables, VariableResolver};
use super::state::TaskResult;
use crate::process::{capture_output, exit_status_code};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Execute one task and classify the outcome
///
/// `command` is `None` when the sequence token named an id missing from the
/// task registry. The command is split at the first whitespace into a
/// program and a single raw argument string; no shell tokenization or
/// quoting is applied.
pub async fn execute_task(
    task_id: &str,
    command: Option<&str>,
    resolver: &VariableResolver,
    vars: &ResolvedVariables,
    working_dir: &Path,
) -> TaskResult {
    let Some(raw) = command else {
        tracing::warn!(task = task_id, "sequence references unknown task id");
        return TaskResult::failure(task_id, "", vec!["invalid task id".into()]);
    };

    let resolved = match resolver.resolve_command(raw, vars) {
        Ok(resolved) => resolved,
        Err(errors) => {
            tracing::warn!(task = task_id, ?errors, "command resolution failed");
            return TaskResult::failure(task_id, raw, errors);
        }
    };

    if resolved.trim().is_empty() {
        return TaskResult::failure(task_id, &resolved, vec!["empty command".into()]);
    }

    let (program, argument) = match resolved.split_once(char::is_whitespace) {
        Some((program, rest)) => (program, Some(rest)),
        None => (resolved.as_str(), None),
    };

    let mut cmd = Command::new(program);
    if let Some(argument) = argument.filter(|a| !a.is_empty()) {
        cmd.arg(argument);
    }

    tracing::debug!(task = task_id, command = %resolved, "running task command");

    let mut child = match cmd
        .current_dir(working_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return TaskResult::failure(
                task_id,
                &resolved,
                vec![format!("failed to launch '{}': {}", program, e)],
            );
        }
    };

    let output = match capture_output(&mut child).await {
        Ok(output) => output,
        Err(e) => return TaskResult::failure(task_id, &resolved, vec![e.to_string()]),
    };

    if output.status.success() {
        tracing::debug!(task = task_id, "task command succeeded");
        TaskResult::success(task_id, resolved, output.stdout)
    } else {
        let message = if output.stderr.trim().is_empty() {
            match exit_status_code(&output.status) {
                Some(code) => format!("command exited with code {}", code),
                None => "command exited abnormally".into(),
            }
        } else {
            output.stderr
        };
        tracing::debug!(task = task_id, "task command failed");
        TaskResult::failure(task_id, resolved, vec![message])
    }
}
