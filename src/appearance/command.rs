//! Out-of-process command execution for appearance backends.

use anyhow::{Context, Result};
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

use super::CompletionCallback;

/// Run a command to completion on a worker thread.
///
/// Failures are logged here and never reported to the caller. `on_complete`
/// runs after the command exits, also when it failed or could not start.
pub fn run_detached(program: &'static str, args: Vec<String>, on_complete: Option<CompletionCallback>) {
    // Shared so the callback still fires if the worker thread cannot be spawned
    let callback = Arc::new(Mutex::new(on_complete));
    let worker_callback = Arc::clone(&callback);

    let spawned = thread::Builder::new()
        .name(format!("switchr-{program}"))
        .spawn(move || {
            run_logged(program, &args);
            finish(&worker_callback);
        });

    if let Err(e) = spawned {
        log_pipe!();
        log_error!("Failed to start worker for {program}: {e}");
        finish(&callback);
    }
}

fn finish(callback: &Mutex<Option<CompletionCallback>>) {
    let taken = callback.lock().unwrap_or_else(|e| e.into_inner()).take();
    if let Some(callback) = taken {
        callback();
    }
}

/// Run a command and log a non-zero exit or spawn failure. Returns whether it succeeded.
pub fn run_logged(program: &str, args: &[String]) -> bool {
    match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
    {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log_pipe!();
            log_warning!("{program} exited with {}", output.status);
            let stderr = stderr.trim();
            if !stderr.is_empty() {
                log_indented!("{stderr}");
            }
            false
        }
        Err(e) => {
            log_pipe!();
            log_error!("Failed to run {program}: {e}");
            false
        }
    }
}

/// Run a short query command synchronously and capture its output.
pub fn query(program: &str, args: &[&str]) -> Result<Output> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("Failed to run {program}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn test_completion_fires_when_program_is_missing() {
        let (tx, rx) = channel();
        run_detached(
            "switchr-definitely-not-a-real-program",
            Vec::new(),
            Some(Box::new(move || {
                let _ = tx.send(());
            })),
        );
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_run_logged_reports_spawn_failure() {
        assert!(!run_logged("switchr-definitely-not-a-real-program", &[]));
    }

    #[test]
    fn test_query_missing_program_is_an_error() {
        assert!(query("switchr-definitely-not-a-real-program", &[]).is_err());
    }
}
