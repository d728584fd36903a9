use log::{info, warn};
use tauri::{AppHandle, Emitter, State};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    device::{ConnectionEvent, ConnectionMonitor, ConnectionState, ScanReport},
    AppState,
};

/// Event name carrying `{ connected: bool }` on every confirmed transition.
pub const CONNECTION_EVENT: &str = "mcu-connection-changed";

fn monitor_from_state(state: &State<'_, AppState>) -> ConnectionMonitor {
    state.monitor.clone()
}

/// Relays monitor transitions to the webview until the monitor shuts down.
pub fn spawn_event_forwarder(app_handle: AppHandle, monitor: &ConnectionMonitor) {
    let mut events = monitor.subscribe();
    let cancel_token = monitor.cancel_token();
    let monitor = monitor.clone();

    tauri::async_runtime::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = cancel_token.cancelled() => break,
                received = events.recv() => match received {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        // Edges were dropped; resync with the current state.
                        warn!("connection event relay skipped {skipped} events");
                        ConnectionEvent::from(monitor.current())
                    }
                    Err(RecvError::Closed) => break,
                },
            };

            if let Err(err) = app_handle.emit(CONNECTION_EVENT, event) {
                warn!("failed to emit {CONNECTION_EVENT}: {err}");
            }
        }
        info!("connection event relay stopped");
    });
}

/// Current presence; later changes arrive as [`CONNECTION_EVENT`] events.
#[tauri::command]
pub fn check_connection(state: State<'_, AppState>) -> ConnectionEvent {
    state.monitor.current().into()
}

/// Resolves once the microcontroller reaches the requested presence.
#[tauri::command]
pub async fn wait_for_connection(
    state: State<'_, AppState>,
    connected: bool,
) -> Result<ConnectionEvent, String> {
    let monitor = monitor_from_state(&state);
    let target = ConnectionState::from_matched(connected);
    monitor
        .await_state(target)
        .await
        .map_err(|e| e.to_string())?;
    Ok(target.into())
}

#[tauri::command]
pub async fn scan_devices(state: State<'_, AppState>) -> Result<ScanReport, String> {
    let monitor = monitor_from_state(&state);
    monitor.scan_once().await.map_err(|e| e.to_string())
}
