//! Process execution utilities
//!
//! Runs external tools (yt-dlp, ffmpeg) and captures their output.
//! No timeout is applied: a job waits for its tool for as long as it runs.
//! Children are killed if the awaiting future is dropped.

use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use crate::core::error::AppError;

/// Captured result of an external process.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Last non-empty line of stdout, trimmed.
    pub fn last_stdout_line(&self) -> Option<&str> {
        self.stdout.lines().rev().map(str::trim).find(|l| !l.is_empty())
    }
}

/// Run a command to completion and capture stdout/stderr as lossy UTF-8.
///
/// A non-zero exit is *not* an error here; callers decide what it means.
/// Spawn failures (binary missing, permission denied) surface as `AppError::Io`.
pub async fn run_captured(cmd: &mut Command) -> Result<ProcessOutput, AppError> {
    cmd.stdin(Stdio::null()).kill_on_drop(true);

    log::debug!("Running {:?}", cmd.as_std());
    let output = cmd.output().await?;

    Ok(ProcessOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
