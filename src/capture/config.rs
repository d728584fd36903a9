use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the external capture program is launched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CaptureConfig {
    /// Executable to spawn, normally the project's virtualenv interpreter.
    pub program: PathBuf,

    /// Arguments placed before `-d <destination> -i <init>`.
    pub program_args: Vec<String>,

    /// Refuse capture requests while no microcontroller is attached.
    pub require_connection: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            // -u keeps the interpreter's stdout unbuffered so progress lines arrive live.
            program_args: vec!["-u".into(), "scripts/capture_data.py".into()],
            require_connection: true,
        }
    }
}

fn default_program() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(".venv/Scripts/python.exe")
    } else {
        PathBuf::from(".venv/bin/python3")
    }
}
