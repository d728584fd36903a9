use serde::Serialize;
use tauri::State;

use crate::{
    capture::{CaptureOrchestrator, CaptureReport, CaptureRequest},
    AppState, ContentReply,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReply {
    /// Success message or failure description, ready to display.
    pub content: String,
    pub report: CaptureReport,
}

fn orchestrator_from_state(state: &State<'_, AppState>) -> CaptureOrchestrator {
    state.capture.clone()
}

/// Failures travel inside the reply, so this never returns `Err`.
#[tauri::command]
pub async fn capture_data(
    state: State<'_, AppState>,
    request: CaptureRequest,
) -> Result<CaptureReply, String> {
    let orchestrator = orchestrator_from_state(&state);
    let connection = state.monitor.current();

    let report = orchestrator.capture_gated(&request, connection).await;
    Ok(CaptureReply {
        content: report.outcome.message(),
        report,
    })
}

/// Folder picker for the capture destination. Empty content when cancelled.
#[tauri::command]
pub async fn select_directory(state: State<'_, AppState>) -> Result<ContentReply<String>, String> {
    let start_dir = orchestrator_from_state(&state).default_dir().to_path_buf();

    let picked = rfd::AsyncFileDialog::new()
        .set_directory(start_dir)
        .pick_folder()
        .await;

    Ok(ContentReply {
        content: picked
            .map(|handle| handle.path().display().to_string())
            .unwrap_or_default(),
    })
}
