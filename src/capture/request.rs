use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const EXTENSION: &str = ".csv";

/// One capture call as sent by the UI. Empty strings mean "use the default".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureRequest {
    pub path: Option<String>,
    pub file_name: Option<String>,
    pub init_flag: bool,
}

impl CaptureRequest {
    pub fn new(path: Option<String>, file_name: Option<String>, init_flag: bool) -> Self {
        Self {
            path,
            file_name,
            init_flag,
        }
    }

    /// `{path or default_dir}/{file_name or timestamp}.csv`. The file name is
    /// always nested under the directory: root, prefix and `..` components of
    /// `file_name` are dropped before joining.
    pub fn destination(&self, default_dir: &Path, now: DateTime<Utc>) -> PathBuf {
        let directory = match non_empty(&self.path) {
            Some(dir) => PathBuf::from(dir),
            None => default_dir.to_path_buf(),
        };

        let relative = non_empty(&self.file_name)
            .map(contained)
            .filter(|name| !name.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(timestamp_stem(now)));

        let mut file_name = relative.into_os_string();
        if !file_name.to_string_lossy().ends_with(EXTENSION) {
            file_name.push(EXTENSION);
        }

        directory.join(file_name)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Keeps only the plain segments of `name`, so joining it cannot leave the
/// destination directory.
fn contained(name: &str) -> PathBuf {
    Path::new(name)
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment),
            _ => None,
        })
        .collect()
}

/// ISO-8601 to the second, with `:` swapped for `-` so it is a valid file name
/// on every host and still sorts chronologically.
pub fn timestamp_stem(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// `<home>/Downloads`, or `./Downloads` when the home directory is unknown.
pub fn default_download_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Downloads")
}
