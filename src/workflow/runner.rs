//! Workflow orchestration
//!
//! Drives stages strictly in declaration order: stage N+1 never starts
//! before every task of stage N has completed, regardless of outcome.
//! Tasks within a stage run concurrently, gated by a bounded worker pool
//! sized by the configured concurrency limit.

use super::executor::execute_task;
use super::planner::plan_stages;
use super::resolver::VariableResolver;
use super::state::{ResultSink, RunSummary, TaskResult};
use crate::cli::output::{OutputEvent, OutputHandler};
use crate::config::Workflow;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Workflow runner
pub struct WorkflowRunner {
    max_concurrency: usize,
}

impl WorkflowRunner {
    /// Create a runner with the given concurrency limit; 0 means one
    /// worker per CPU core
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = if max_concurrency == 0 {
            num_cpus::get()
        } else {
            max_concurrency
        };
        Self { max_concurrency }
    }

    /// Run every stage of the workflow and aggregate task results
    ///
    /// Variable resolution completes fully before the first stage starts,
    /// so concurrently-running tasks only ever read the resolved map.
    /// Per-task failures are isolated into their `TaskResult`; this method
    /// itself cannot fail.
    pub async fn run(&self, workflow: &Workflow, handler: &dyn OutputHandler) -> RunSummary {
        let start = Instant::now();

        let resolver = VariableResolver::new();
        let vars = resolver.resolve_variables(&workflow.variables);
        for (key, error) in vars.env_errors() {
            tracing::warn!(variable = %key, "{}", error);
        }

        let stages = plan_stages(&workflow.sequence);
        let total = stages.len();
        let sink = ResultSink::new();
        let pool = Semaphore::new(self.max_concurrency);

        tracing::info!(
            workflow = %workflow.name,
            stages = total,
            max_concurrency = self.max_concurrency,
            "starting workflow run"
        );

        for (index, stage) in stages.iter().enumerate() {
            handler.emit(OutputEvent::StageStart {
                index: index + 1,
                total,
                task_ids: stage.task_ids.clone(),
            });

            let mut running: FuturesUnordered<_> = stage
                .task_ids
                .iter()
                .map(|task_id| {
                    let pool = &pool;
                    let resolver = &resolver;
                    let vars = &vars;
                    let sink = &sink;
                    let command = workflow.tasks.get(task_id).map(String::as_str);

                    async move {
                        let _permit = match pool.acquire().await {
                            Ok(permit) => permit,
                            Err(_) => {
                                // the pool is never closed during a run
                                let result = TaskResult::failure(
                                    task_id,
                                    command.unwrap_or(""),
                                    vec!["worker pool closed before task could start".into()],
                                );
                                sink.push(result);
                                return (task_id.clone(), false, 0);
                            }
                        };

                        let task_start = Instant::now();
                        let result = execute_task(
                            task_id,
                            command,
                            resolver,
                            vars,
                            &workflow.working_dir,
                        )
                        .await;

                        let success = result.is_success();
                        sink.push(result);
                        (
                            task_id.clone(),
                            success,
                            task_start.elapsed().as_millis() as u64,
                        )
                    }
                })
                .collect();

            // stage barrier: drain every task before the next stage starts
            while let Some((task_id, success, duration_ms)) = running.next().await {
                handler.emit(OutputEvent::TaskComplete {
                    task_id,
                    success,
                    duration_ms,
                });
            }
        }

        let summary = RunSummary {
            results: sink.snapshot(),
            duration: start.elapsed(),
        };
        tracing::info!(
            tasks = summary.results.len(),
            failed = summary.failed_count(),
            "workflow run finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::output::QuietHandler;
    use std::collections::HashMap;
    use std::time::Duration;
    use tempfile::TempDir;

    fn workflow(dir: &TempDir, tasks: &[(&str, &str)], sequence: &[&str]) -> Workflow {
        Workflow {
            name: "test".into(),
            description: String::new(),
            working_dir: dir.path().to_path_buf(),
            variables: HashMap::new(),
            tasks: tasks
                .iter()
                .map(|(id, cmd)| (id.to_string(), cmd.to_string()))
                .collect(),
            sequence: sequence.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn sequential_stages_preserve_order() {
        let dir = TempDir::new().unwrap();
        let wf = workflow(
            &dir,
            &[("a", "echo a"), ("b", "echo b"), ("c", "echo c")],
            &["a", "b,c"],
        );

        let summary = WorkflowRunner::new(2).run(&wf, &QuietHandler).await;

        assert_eq!(summary.results.len(), 3);
        assert_eq!(summary.results[0].task_id, "a");
        let tail: Vec<_> = summary.results[1..]
            .iter()
            .map(|r| r.task_id.as_str())
            .collect();
        assert!(tail.contains(&"b") && tail.contains(&"c"));
        assert!(summary.all_succeeded());
    }

    #[tokio::test]
    async fn unknown_task_id_fails_but_run_continues() {
        let dir = TempDir::new().unwrap();
        let wf = workflow(&dir, &[("a", "echo a")], &["x", "a"]);

        let summary = WorkflowRunner::new(1).run(&wf, &QuietHandler).await;

        assert_eq!(summary.results.len(), 2);
        assert_eq!(summary.results[0].task_id, "x");
        assert_eq!(summary.results[0].errors, vec!["invalid task id"]);
        assert!(summary.results[1].is_success());
        assert!(!summary.all_succeeded());
    }

    #[tokio::test]
    async fn variables_resolve_once_for_all_tasks() {
        let dir = TempDir::new().unwrap();
        let mut wf = workflow(
            &dir,
            &[("a", "echo ${word}"), ("b", "echo ${word}")],
            &["a,b"],
        );
        wf.variables.insert("word".into(), "shared".into());

        let summary = WorkflowRunner::new(2).run(&wf, &QuietHandler).await;

        assert!(summary.all_succeeded());
        for result in &summary.results {
            assert_eq!(result.command, "echo shared");
            assert_eq!(result.stdout, "shared\n");
        }
    }

    #[tokio::test]
    async fn failed_resolution_does_not_abort_other_tasks() {
        let dir = TempDir::new().unwrap();
        let wf = workflow(&dir, &[("bad", "echo ${missing}"), ("ok", "echo fine")], &["bad,ok"]);

        let summary = WorkflowRunner::new(2).run(&wf, &QuietHandler).await;

        let bad = summary.results.iter().find(|r| r.task_id == "bad").unwrap();
        let ok = summary.results.iter().find(|r| r.task_id == "ok").unwrap();
        assert_eq!(bad.errors, vec!["could not retrieve variable ${missing}"]);
        assert!(ok.is_success());
    }

    #[tokio::test]
    async fn worker_pool_bounds_concurrent_tasks() {
        let dir = TempDir::new().unwrap();
        let wf = workflow(&dir, &[("s1", "sleep 0.5"), ("s2", "sleep 0.5")], &["s1,s2"]);

        let start = Instant::now();
        let summary = WorkflowRunner::new(1).run(&wf, &QuietHandler).await;
        let elapsed = start.elapsed();

        assert!(summary.all_succeeded());
        // with one worker the sleeps cannot overlap
        assert!(
            elapsed >= Duration::from_millis(950),
            "elapsed: {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn stage_group_runs_concurrently() {
        let dir = TempDir::new().unwrap();
        let wf = workflow(&dir, &[("s1", "sleep 0.5"), ("s2", "sleep 0.5")], &["s1,s2"]);

        let start = Instant::now();
        let summary = WorkflowRunner::new(2).run(&wf, &QuietHandler).await;
        let elapsed = start.elapsed();

        assert!(summary.all_succeeded());
        assert!(
            elapsed < Duration::from_millis(950),
            "elapsed: {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn single_task_stage_runs_alone() {
        let dir = TempDir::new().unwrap();
        let wf = workflow(&dir, &[("only", "echo solo")], &["only"]);

        let summary = WorkflowRunner::new(4).run(&wf, &QuietHandler).await;

        assert_eq!(summary.results.len(), 1);
        assert_eq!(summary.results[0].stdout, "solo\n");
    }
}
