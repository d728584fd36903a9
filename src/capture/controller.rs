use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::device::ConnectionState;
use crate::error::CaptureError;

use super::config::CaptureConfig;
use super::outcome::{CaptureOutcome, CaptureReport};
use super::request::CaptureRequest;
use super::runner::run_capture_program;

/// Runs capture requests one at a time. A request arriving while another run
/// holds the slot is rejected, not queued.
#[derive(Clone)]
pub struct CaptureOrchestrator {
    config: CaptureConfig,
    default_dir: PathBuf,
    slot: Arc<Mutex<()>>,
}

impl CaptureOrchestrator {
    pub fn new(config: CaptureConfig, default_dir: PathBuf) -> Self {
        Self {
            config,
            default_dir,
            slot: Arc::new(Mutex::new(())),
        }
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    pub async fn capture(&self, request: &CaptureRequest) -> CaptureOutcome {
        self.capture_with_report(request).await.outcome
    }

    /// Applies the connection gate before capturing when the config asks for it.
    pub async fn capture_gated(
        &self,
        request: &CaptureRequest,
        state: ConnectionState,
    ) -> CaptureReport {
        if self.config.require_connection && !state.is_connected() {
            let run_id = Uuid::new_v4();
            warn!("[capture {run_id}] rejected: no microcontroller attached");
            return failed(run_id, CaptureError::NotConnected, Instant::now());
        }
        self.capture_with_report(request).await
    }

    pub async fn capture_with_report(&self, request: &CaptureRequest) -> CaptureReport {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let Ok(_slot) = self.slot.try_lock() else {
            warn!("[capture {run_id}] rejected: another capture is running");
            return failed(run_id, CaptureError::Busy, started);
        };

        let destination = request.destination(&self.default_dir, Utc::now());
        info!(
            "[capture {run_id}] capturing to {} (init={})",
            destination.display(),
            request.init_flag
        );

        let result =
            run_capture_program(&self.config, &destination, request.init_flag, run_id).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(stdout) => {
                info!("[capture {run_id}] finished in {elapsed_ms}ms");
                CaptureReport {
                    run_id,
                    outcome: CaptureOutcome::Succeeded {
                        produced_file_path: destination,
                    },
                    stdout,
                    elapsed_ms,
                }
            }
            Err(err) => {
                error!("[capture {run_id}] failed after {elapsed_ms}ms: {err}");
                failed(run_id, err, started)
            }
        }
    }
}

fn failed(run_id: Uuid, err: CaptureError, started: Instant) -> CaptureReport {
    CaptureReport {
        run_id,
        outcome: CaptureOutcome::Failed {
            detail: err.to_string(),
        },
        stdout: Vec::new(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}
