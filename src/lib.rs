pub mod capture;
pub mod device;
pub mod error;
pub mod ingest;
pub mod settings;
mod utils;

#[cfg(feature = "desktop")]
pub use desktop::run;

/// `{ content }` envelope shared by the request/response commands.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContentReply<T> {
    pub content: T,
}

#[cfg(feature = "desktop")]
pub(crate) use desktop::AppState;

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Arc;

    use log::{error, info};
    use tauri::{Manager, RunEvent, State};

    use crate::{
        capture::{
            commands::{capture_data, select_directory},
            default_download_dir, CaptureOrchestrator,
        },
        device::{
            commands::{check_connection, scan_devices, spawn_event_forwarder, wait_for_connection},
            ConnectionMonitor, SerialPortEnumerator,
        },
        ingest::commands::{load_pressure_data, load_pressure_file},
        settings::{SettingsStore, UserSettings},
    };

    pub(crate) struct AppState {
        pub(crate) monitor: ConnectionMonitor,
        pub(crate) capture: CaptureOrchestrator,
        pub(crate) settings: SettingsStore,
    }

    #[tauri::command]
    fn get_settings(state: State<AppState>) -> UserSettings {
        state.settings.snapshot()
    }

    /// Persists new settings. The monitor and capture sections apply on next launch.
    #[tauri::command]
    fn update_settings(settings: UserSettings, state: State<AppState>) -> Result<(), String> {
        state.settings.update(settings).map_err(|e| e.to_string())
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        // Initialize logging (reads RUST_LOG env var, info by default)
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        log::info!("zeta starting up...");

        tauri::Builder::default()
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_data_dir = app
                        .path()
                        .app_data_dir()
                        .map_err(|err| anyhow::anyhow!(err))?;
                    std::fs::create_dir_all(&app_data_dir)?;

                    let settings = SettingsStore::new(app_data_dir.join("settings.json"))?;
                    info!("settings loaded from {}", settings.path().display());

                    let monitor =
                        ConnectionMonitor::new(Arc::new(SerialPortEnumerator), settings.monitor());
                    tauri::async_runtime::block_on(monitor.start())?;
                    spawn_event_forwarder(app.handle().clone(), &monitor);

                    let capture =
                        CaptureOrchestrator::new(settings.capture(), default_download_dir());

                    app.manage(AppState {
                        monitor,
                        capture,
                        settings,
                    });

                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                check_connection,
                wait_for_connection,
                scan_devices,
                capture_data,
                select_directory,
                load_pressure_data,
                load_pressure_file,
                get_settings,
                update_settings,
            ])
            .build(tauri::generate_context!())
            .expect("error while building tauri application")
            .run(|app_handle, event| {
                if let RunEvent::Exit = event {
                    if let Some(state) = app_handle.try_state::<AppState>() {
                        if let Err(err) = tauri::async_runtime::block_on(state.monitor.shutdown()) {
                            error!("connection monitor did not shut down cleanly: {err:?}");
                        }
                    }
                }
            });
    }
}
