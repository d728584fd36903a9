use tauri::State;

use crate::{
    ingest::{ingest, PressureFrame},
    AppState, ContentReply,
};

/// Picks a CSV capture and ingests it. `None` when the picker is cancelled.
#[tauri::command]
pub async fn load_pressure_data(
    state: State<'_, AppState>,
) -> Result<Option<ContentReply<PressureFrame>>, String> {
    let config = state.settings.ingest();

    let Some(handle) = rfd::AsyncFileDialog::new()
        .add_filter("CSV", &["csv"])
        .pick_file()
        .await
    else {
        return Ok(None);
    };

    let frame = ingest(handle.path(), config)
        .await
        .map_err(|e| e.to_string())?;
    Ok(Some(ContentReply { content: frame }))
}

/// Ingests a known file, e.g. the path returned by a capture that just finished.
#[tauri::command]
pub async fn load_pressure_file(
    state: State<'_, AppState>,
    path: String,
) -> Result<ContentReply<PressureFrame>, String> {
    let config = state.settings.ingest();
    let frame = ingest(path, config).await.map_err(|e| e.to_string())?;
    Ok(ContentReply { content: frame })
}
