use serde::{Deserialize, Serialize};

/// Column layout of a capture file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// First column of the right band. Columns before it form the left band.
    /// Equal to the sensor grid width of one mat.
    pub split_column: usize,

    /// Leading records dropped before data rows begin.
    pub header_lines: usize,

    /// Strip surrounding whitespace from each cell. Off by default so values
    /// reach the UI exactly as written.
    pub trim_cells: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::with_header(16)
    }
}

impl IngestConfig {
    pub fn headerless(split_column: usize) -> Self {
        Self {
            split_column,
            header_lines: 0,
            trim_cells: false,
        }
    }

    /// Layout written by the capture program: one header line, then data.
    pub fn with_header(split_column: usize) -> Self {
        Self {
            split_column,
            header_lines: 1,
            trim_cells: false,
        }
    }
}
