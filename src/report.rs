//! Run report generation
//!
//! Renders system information and aggregated task results as
//! `report.csv` in the workflow working directory. Captured stdout is
//! retained in memory only; the report's OUTPUT column is always empty.

use crate::workflow::TaskResult;
use std::path::{Path, PathBuf};

const REPORT_FILE: &str = "report.csv";
const COLUMN_HEADER: &str = "TASK_ID,COMMAND,OUTPUT,ERROR,SUCCESSFUL";

/// Write the run report into `working_dir`, returning the report path
///
/// I/O failures propagate to the caller for logging; they never affect
/// task outcomes already recorded.
pub fn write_report(
    working_dir: &Path,
    system_info: &[(String, String)],
    results: &[TaskResult],
) -> std::io::Result<PathBuf> {
    let path = working_dir.join(REPORT_FILE);
    std::fs::write(&path, render(system_info, results))?;
    Ok(path)
}

fn render(system_info: &[(String, String)], results: &[TaskResult]) -> String {
    let mut out = String::new();

    out.push_str("System Information:\n");
    out.push_str("==============================\n");
    let keys: Vec<&str> = system_info.iter().map(|(k, _)| k.as_str()).collect();
    let values: Vec<&str> = system_info.iter().map(|(_, v)| v.as_str()).collect();
    out.push_str(&keys.join(","));
    out.push('\n');
    out.push_str(&values.join(","));
    out.push('\n');

    out.push_str(COLUMN_HEADER);
    out.push('\n');
    for result in results {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            result.task_id,
            result.command,
            "",
            result.errors.join(";"),
            if result.is_success() { 1 } else { 0 },
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn info() -> Vec<(String, String)> {
        vec![
            ("OS".into(), "Linux".into()),
            ("Host".into(), "box".into()),
        ]
    }

    fn sample_results() -> Vec<TaskResult> {
        vec![
            TaskResult::success("a", "echo hi", "hi\n".into()),
            TaskResult::failure(
                "b",
                "cat missing.txt",
                vec!["no such file".into(), "exit 1".into()],
            ),
        ]
    }

    #[test]
    fn renders_system_info_block() {
        let text = render(&info(), &[]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "System Information:");
        assert_eq!(lines[1], "==============================");
        assert_eq!(lines[2], "OS,Host");
        assert_eq!(lines[3], "Linux,box");
        assert_eq!(lines[4], COLUMN_HEADER);
    }

    #[test]
    fn renders_one_row_per_result() {
        let text = render(&info(), &sample_results());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[5], "a,echo hi,,,1");
        assert_eq!(lines[6], "b,cat missing.txt,,no such file;exit 1,0");
    }

    #[test]
    fn output_column_is_always_empty() {
        let results = vec![TaskResult::success("a", "echo hi", "captured output".into())];
        let text = render(&[], &results);
        assert!(!text.contains("captured output"));
    }

    #[test]
    fn writes_report_into_working_directory() {
        let dir = TempDir::new().unwrap();
        let path = write_report(dir.path(), &info(), &sample_results()).unwrap();
        assert_eq!(path, dir.path().join("report.csv"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains(COLUMN_HEADER));
    }

    #[test]
    fn write_failure_surfaces_as_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(write_report(&missing, &info(), &[]).is_err());
    }
}
