//! Child process plumbing for task execution

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Child;

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

fn exit_status_code_parts(code: Option<i32>, _signal: Option<i32>) -> Option<i32> {
    if let Some(code) = code {
        return Some(code);
    }
    #[cfg(unix)]
    {
        if let Some(signal) = _signal {
            return Some(128 + signal);
        }
    }
    None
}

/// Extract an exit code from an `ExitStatus`; signal-terminated processes
/// map to 128 + signal number on Unix.
pub(crate) fn exit_status_code(status: &std::process::ExitStatus) -> Option<i32> {
    let code = status.code();
    #[cfg(unix)]
    let signal = status.signal();
    #[cfg(not(unix))]
    let signal = None;
    exit_status_code_parts(code, signal)
}

/// Errors while capturing a child process's output
#[derive(Debug, Error)]
pub(crate) enum CaptureError {
    #[error("failed to read {stream} from child process: {source}")]
    Read {
        stream: &'static str,
        source: std::io::Error,
    },

    #[error("failed to wait for child process: {source}")]
    Wait { source: std::io::Error },
}

/// Buffered output of a completed child process
#[derive(Debug)]
pub(crate) struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

/// Wait for a child to finish, reading stdout and stderr concurrently to
/// avoid pipe deadlock. On a read failure the child is killed before the
/// error is returned.
pub(crate) async fn capture_output(child: &mut Child) -> Result<CapturedOutput, CaptureError> {
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let stdout_fut = async move {
        if let Some(mut out) = stdout_pipe {
            let mut buf = String::new();
            out.read_to_string(&mut buf)
                .await
                .map(|_| buf)
                .map_err(|e| ("stdout", e))
        } else {
            Ok(String::new())
        }
    };

    let stderr_fut = async move {
        if let Some(mut err) = stderr_pipe {
            let mut buf = String::new();
            err.read_to_string(&mut buf)
                .await
                .map(|_| buf)
                .map_err(|e| ("stderr", e))
        } else {
            Ok(String::new())
        }
    };

    let (stdout, stderr) = match tokio::try_join!(stdout_fut, stderr_fut) {
        Ok(output) => output,
        Err((stream, source)) => {
            let _ = child.kill().await;
            return Err(CaptureError::Read { stream, source });
        }
    };

    let status = child
        .wait()
        .await
        .map_err(|e| CaptureError::Wait { source: e })?;

    Ok(CapturedOutput {
        stdout,
        stderr,
        status,
    })
}
