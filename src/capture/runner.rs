use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::error::CaptureError;

use super::config::CaptureConfig;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Trailing stderr lines kept in a failure detail.
const MAX_DETAIL_LINES: usize = 20;

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn label(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Builds `<program> <program_args..> -d <destination> -i <init_flag>`.
pub fn build_command(config: &CaptureConfig, destination: &Path, init_flag: bool) -> Command {
    let mut command = Command::new(&config.program);
    command
        .args(&config.program_args)
        .arg("-d")
        .arg(destination)
        .arg("-i")
        .arg(if init_flag { "true" } else { "false" })
        .env("PYTHONUNBUFFERED", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}

/// Spawns the capture program and waits for it to exit. Returns its stdout
/// lines on a zero exit status. Both pipes are fully drained before this
/// returns.
pub async fn run_capture_program(
    config: &CaptureConfig,
    destination: &Path,
    init_flag: bool,
    run_id: Uuid,
) -> Result<Vec<String>, CaptureError> {
    let mut child = build_command(config, destination, init_flag)
        .spawn()
        .map_err(|err| CaptureError::Spawn {
            program: config.program.display().to_string(),
            reason: err.to_string(),
        })?;

    log_info!(
        "[capture {run_id}] started pid={:?} destination={}",
        child.id(),
        destination.display()
    );

    let stdout_task = tokio::spawn(collect_lines(child.stdout.take(), run_id, Stream::Stdout));
    let stderr_task = tokio::spawn(collect_lines(child.stderr.take(), run_id, Stream::Stderr));

    let status = child
        .wait()
        .await
        .map_err(|err| CaptureError::Wait(err.to_string()))?;

    let stdout = collected_or_empty(stdout_task.await, run_id, Stream::Stdout);
    let stderr = collected_or_empty(stderr_task.await, run_id, Stream::Stderr);

    if status.success() {
        return Ok(stdout);
    }

    let tail_start = stderr.len().saturating_sub(MAX_DETAIL_LINES);
    let detail = if stderr.is_empty() {
        "no error output".to_string()
    } else {
        stderr[tail_start..].join("\n")
    };

    Err(CaptureError::ExitStatus {
        status: status.to_string(),
        detail,
    })
}

fn collected_or_empty(
    joined: Result<Vec<String>, JoinError>,
    run_id: Uuid,
    stream: Stream,
) -> Vec<String> {
    joined.unwrap_or_else(|err| {
        log_warn!("[capture {run_id}] {} reader task failed: {err}", stream.label());
        Vec::new()
    })
}

async fn collect_lines<R>(reader: Option<R>, run_id: Uuid, stream: Stream) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Vec::new();
    };

    let mut lines = BufReader::new(reader).lines();
    let mut collected = Vec::new();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                match stream {
                    Stream::Stdout => log_info!("[capture {run_id}] {line}"),
                    Stream::Stderr => log_warn!("[capture {run_id}] stderr: {line}"),
                }
                collected.push(line);
            }
            Ok(None) => break,
            Err(err) => {
                log_warn!("[capture {run_id}] output stream unreadable: {err}");
                break;
            }
        }
    }

    collected
}
