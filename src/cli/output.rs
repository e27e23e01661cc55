//! Live diagnostics during a workflow run
//!
//! Console output is advisory; the report is the artifact of record. All
//! handler output goes to stderr so captured task stdout never mixes with
//! diagnostics.

use std::io::{self, Write};
use std::path::PathBuf;

/// Events emitted during workflow execution
#[derive(Debug, Clone)]
pub enum OutputEvent {
    RunStart {
        name: String,
        stages: usize,
        tasks: usize,
    },
    StageStart {
        index: usize,
        total: usize,
        task_ids: Vec<String>,
    },
    TaskComplete {
        task_id: String,
        success: bool,
        duration_ms: u64,
    },
    ReportWritten {
        path: PathBuf,
    },
    RunComplete {
        success: bool,
        duration_ms: u64,
        tasks_run: usize,
        tasks_failed: usize,
    },
    RunError {
        error: String,
    },
    Info {
        message: String,
    },
}

/// Output handler trait
pub trait OutputHandler: Send + Sync {
    fn emit(&self, event: OutputEvent);
}

/// Console output handler
pub struct ConsoleHandler;

impl ConsoleHandler {
    fn format_duration(ms: u64) -> String {
        if ms < 1000 {
            format!("{}ms", ms)
        } else {
            format!("{:.1}s", ms as f64 / 1000.0)
        }
    }
}

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        match event {
            OutputEvent::RunStart {
                name,
                stages,
                tasks,
            } => {
                eprintln!("Running workflow '{}' ({} tasks, {} stages)", name, tasks, stages);
            }
            OutputEvent::StageStart {
                index,
                total,
                task_ids,
            } => {
                eprintln!("[{}/{}] {}", index, total, task_ids.join(", "));
                let _ = io::stderr().flush();
            }
            OutputEvent::TaskComplete {
                task_id,
                success,
                duration_ms,
            } => {
                let mark = if success { "✓" } else { "✗" };
                eprintln!(
                    "  {} {} ({})",
                    mark,
                    task_id,
                    Self::format_duration(duration_ms)
                );
            }
            OutputEvent::ReportWritten { path } => {
                eprintln!("Report written to {}", path.display());
            }
            OutputEvent::RunComplete {
                success,
                duration_ms,
                tasks_run,
                tasks_failed,
            } => {
                if success {
                    eprintln!(
                        "✓ {} tasks completed in {}",
                        tasks_run,
                        Self::format_duration(duration_ms)
                    );
                } else {
                    eprintln!(
                        "✗ {} of {} tasks failed ({})",
                        tasks_failed,
                        tasks_run,
                        Self::format_duration(duration_ms)
                    );
                }
            }
            OutputEvent::RunError { error } => {
                eprintln!("✗ {}", error);
            }
            OutputEvent::Info { message } => {
                eprintln!("{}", message);
            }
        }
    }
}

/// Handler that swallows all events; task failures still reach the report
/// and the log
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, _event: OutputEvent) {}
}
