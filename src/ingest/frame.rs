use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Row-major text cells, in file order.
pub type Matrix = Vec<Vec<String>>;

/// Pressure readings of one capture file, split into the mat bands.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PressureFrame {
    pub left_matrix: Matrix,
    pub right_matrix: Matrix,
    /// Reserved for a third mat; the current column layout never fills it.
    pub back_matrix: Matrix,
}

impl PressureFrame {
    pub fn row_count(&self) -> usize {
        self.left_matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left_matrix.is_empty() && self.right_matrix.is_empty() && self.back_matrix.is_empty()
    }
}

/// Append-only accumulator. Only [`FrameBuilder::finish`] hands out a frame,
/// so a failed stream never leaks a partial one.
pub(crate) struct FrameBuilder {
    split_column: usize,
    frame: PressureFrame,
}

impl FrameBuilder {
    pub(crate) fn new(split_column: usize) -> Self {
        Self {
            split_column,
            frame: PressureFrame::default(),
        }
    }

    pub(crate) fn push_row(
        &mut self,
        row: usize,
        record: &StringRecord,
    ) -> Result<(), IngestError> {
        if record.len() < self.split_column {
            return Err(IngestError::MalformedRow {
                row,
                columns: record.len(),
                expected: self.split_column,
            });
        }

        let left = record.iter().take(self.split_column).map(str::to_owned).collect();
        let right = record.iter().skip(self.split_column).map(str::to_owned).collect();
        self.frame.left_matrix.push(left);
        self.frame.right_matrix.push(right);
        Ok(())
    }

    pub(crate) fn finish(self) -> PressureFrame {
        self.frame
    }
}
