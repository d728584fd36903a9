use std::path::PathBuf;

use thiserror::Error;

/// Failures of the serial connection monitor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// Host serial subsystem unavailable or the port query failed.
    #[error("serial port enumeration failed: {0}")]
    Enumeration(String),

    /// Zero ports were reported while the policy requires a definitive answer.
    #[error("serial port list is empty")]
    EmptyPortList,

    #[error("connection monitor is not running")]
    Stopped,
}

/// Failures of a single capture run. Rendered verbatim into the failed outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("a capture is already in progress")]
    Busy,

    #[error("microcontroller is not connected")]
    NotConnected,

    #[error("failed to start capture program {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("capture program exited with {status}: {detail}")]
    ExitStatus { status: String, detail: String },

    #[error("failed while waiting for capture program: {0}")]
    Wait(String),
}

/// Failures while streaming a CSV source into a pressure frame.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read row {row}: {source}")]
    Read {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("row {row} has {columns} columns, expected at least {expected}")]
    MalformedRow {
        row: usize,
        columns: usize,
        expected: usize,
    },

    #[error("ingestion worker failed: {0}")]
    Worker(String),
}
