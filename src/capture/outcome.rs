use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CaptureOutcome {
    #[serde(rename_all = "camelCase")]
    Succeeded { produced_file_path: PathBuf },
    Failed { detail: String },
}

impl CaptureOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Text shown to the user in the capture reply.
    pub fn message(&self) -> String {
        match self {
            Self::Succeeded { produced_file_path } => {
                format!("Data captured to {}", produced_file_path.display())
            }
            Self::Failed { detail } => {
                format!("Data capture failed for the following reason.\n{detail}")
            }
        }
    }
}

/// Outcome plus what the run printed along the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReport {
    pub run_id: Uuid,
    pub outcome: CaptureOutcome,
    pub stdout: Vec<String>,
    pub elapsed_ms: u64,
}
