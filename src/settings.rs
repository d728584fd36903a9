use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{capture::CaptureConfig, device::MonitorConfig, ingest::IngestConfig};

const ENV_CAPTURE_PROGRAM: &str = "ZETA_CAPTURE_PROGRAM";
const ENV_TARGET_MANUFACTURER: &str = "ZETA_TARGET_MANUFACTURER";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserSettings {
    pub monitor: MonitorConfig,
    pub capture: CaptureConfig,
    pub ingest: IngestConfig,
}

impl UserSettings {
    /// Environment wins over the file for the values a developer typically
    /// needs to point elsewhere.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(program) = lookup(ENV_CAPTURE_PROGRAM).filter(|v| !v.is_empty()) {
            self.capture.program = PathBuf::from(program);
        }
        if let Some(target) = lookup(ENV_TARGET_MANUFACTURER).filter(|v| !v.is_empty()) {
            self.monitor.target_manufacturer = target;
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        Self::load(path, |key| std::env::var(key).ok())
    }

    fn load(path: PathBuf, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings in {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };
        data.apply_env_overrides(lookup);

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> UserSettings {
        self.read().clone()
    }

    pub fn monitor(&self) -> MonitorConfig {
        self.read().monitor.clone()
    }

    pub fn capture(&self) -> CaptureConfig {
        self.read().capture.clone()
    }

    pub fn ingest(&self) -> IngestConfig {
        self.read().ingest.clone()
    }

    pub fn update(&self, settings: UserSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::load(dir.path().join("settings.json"), no_env).unwrap();

        let settings = store.snapshot();
        assert_eq!(settings, UserSettings::default());
        assert_eq!(settings.ingest.split_column, 16);
        assert!(settings.monitor.treat_empty_as_absent);
    }

    #[test]
    fn updates_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::load(path.clone(), no_env).unwrap();
        store
            .update(UserSettings {
                ingest: IngestConfig::headerless(8),
                ..UserSettings::default()
            })
            .unwrap();

        let reloaded = SettingsStore::load(path, no_env).unwrap();
        assert_eq!(reloaded.ingest(), IngestConfig::headerless(8));
        assert_eq!(reloaded.monitor(), MonitorConfig::default());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::load(path, no_env).unwrap();
        assert_eq!(store.snapshot(), UserSettings::default());
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "monitor": { "poll_interval_ms": 250 } }"#).unwrap();

        let store = SettingsStore::load(path, no_env).unwrap();
        assert_eq!(store.monitor().poll_interval_ms, 250);
        assert_eq!(store.monitor().target_manufacturer, "arduino");
        assert_eq!(store.capture(), CaptureConfig::default());
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::load(dir.path().join("settings.json"), |key| match key {
            ENV_CAPTURE_PROGRAM => Some("/opt/capture/python".into()),
            ENV_TARGET_MANUFACTURER => Some("wch.cn".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(store.capture().program, PathBuf::from("/opt/capture/python"));
        assert_eq!(store.monitor().target_manufacturer, "wch.cn");
    }
}
