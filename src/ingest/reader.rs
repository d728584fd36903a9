use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use log::info;

use crate::error::IngestError;

use super::config::IngestConfig;
use super::frame::{FrameBuilder, PressureFrame};

/// Streams `path` into a frame on the blocking pool.
pub async fn ingest(
    path: impl Into<PathBuf>,
    config: IngestConfig,
) -> Result<PressureFrame, IngestError> {
    let path = path.into();
    tokio::task::spawn_blocking(move || ingest_file(&path, &config))
        .await
        .map_err(|err| IngestError::Worker(err.to_string()))?
}

pub fn ingest_file(path: &Path, config: &IngestConfig) -> Result<PressureFrame, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let frame = ingest_reader(file, config)?;
    info!(
        "ingested {} rows from {} (split at column {})",
        frame.row_count(),
        path.display(),
        config.split_column
    );
    Ok(frame)
}

/// Folds records one by one into the left/right bands. Row width may vary
/// between records as long as each reaches the split column.
pub fn ingest_reader<R: Read>(
    reader: R,
    config: &IngestConfig,
) -> Result<PressureFrame, IngestError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(if config.trim_cells { Trim::All } else { Trim::None })
        .from_reader(reader);

    let mut builder = FrameBuilder::new(config.split_column);
    let mut record = StringRecord::new();
    let mut row = 0usize;

    loop {
        row += 1;
        let more = csv_reader
            .read_record(&mut record)
            .map_err(|source| IngestError::Read { row, source })?;
        if !more {
            break;
        }
        if row <= config.header_lines {
            continue;
        }
        builder.push_row(row, &record)?;
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn numbered_row(from: usize, to: usize) -> String {
        (from..=to).map(|n| n.to_string()).collect::<Vec<_>>().join(",")
    }

    fn cells(from: usize, to: usize) -> Vec<String> {
        (from..=to).map(|n| n.to_string()).collect()
    }

    #[test]
    fn splits_a_32_column_row_at_16() {
        let csv = format!("{}\n", numbered_row(1, 32));
        let frame = ingest_reader(csv.as_bytes(), &IngestConfig::headerless(16)).unwrap();

        assert_eq!(frame.left_matrix, vec![cells(1, 16)]);
        assert_eq!(frame.right_matrix, vec![cells(17, 32)]);
        assert!(frame.back_matrix.is_empty());
    }

    #[test]
    fn preserves_row_order() {
        let csv = (0..5)
            .map(|i| numbered_row(i * 100 + 1, i * 100 + 32))
            .collect::<Vec<_>>()
            .join("\n");
        let frame = ingest_reader(csv.as_bytes(), &IngestConfig::headerless(16)).unwrap();

        assert_eq!(frame.row_count(), 5);
        for i in 0..5 {
            assert_eq!(frame.left_matrix[i], cells(i * 100 + 1, i * 100 + 16));
            assert_eq!(frame.right_matrix[i], cells(i * 100 + 17, i * 100 + 32));
        }
    }

    #[test]
    fn header_variant_skips_first_line() {
        let csv = "# x,y,z,pressure\n1.0,2.0,3.0,40.5\n4.0,5.0,6.0,41.5\n";
        let frame = ingest_reader(csv.as_bytes(), &IngestConfig::with_header(3)).unwrap();

        assert_eq!(
            frame.left_matrix,
            vec![
                vec!["1.0".to_string(), "2.0".into(), "3.0".into()],
                vec!["4.0".to_string(), "5.0".into(), "6.0".into()],
            ]
        );
        assert_eq!(
            frame.right_matrix,
            vec![vec!["40.5".to_string()], vec!["41.5".to_string()]]
        );
    }

    #[test]
    fn empty_and_header_only_sources_give_empty_frames() {
        let empty = ingest_reader("".as_bytes(), &IngestConfig::headerless(16)).unwrap();
        assert!(empty.is_empty());

        let header_only =
            ingest_reader("a,b,c\n".as_bytes(), &IngestConfig::with_header(16)).unwrap();
        assert!(header_only.is_empty());
    }

    #[test]
    fn row_exactly_at_split_has_empty_right_band() {
        let frame = ingest_reader("1,2\n".as_bytes(), &IngestConfig::headerless(2)).unwrap();
        assert_eq!(frame.left_matrix, vec![cells(1, 2)]);
        assert_eq!(frame.right_matrix, vec![Vec::<String>::new()]);
    }

    #[test]
    fn short_row_is_malformed() {
        let csv = format!("{}\n1,2,3\n", numbered_row(1, 32));
        let err = ingest_reader(csv.as_bytes(), &IngestConfig::headerless(16)).unwrap_err();

        assert!(matches!(
            err,
            IngestError::MalformedRow {
                row: 2,
                columns: 3,
                expected: 16
            }
        ));
    }

    #[test]
    fn unreadable_record_aborts() {
        let bytes: &[u8] = b"1,2\n3,\xff\xfe\n5,6\n";
        let err = ingest_reader(bytes, &IngestConfig::headerless(1)).unwrap_err();
        assert!(matches!(err, IngestError::Read { row: 2, .. }));
    }

    #[test]
    fn cells_are_passed_through_as_text() {
        let csv = "\"007\", 1e3 ,-0.50,n/a\n";
        let frame = ingest_reader(csv.as_bytes(), &IngestConfig::headerless(2)).unwrap();
        assert_eq!(frame.left_matrix, vec![vec!["007".to_string(), " 1e3 ".into()]]);
        assert_eq!(frame.right_matrix, vec![vec!["-0.50".to_string(), "n/a".into()]]);
    }

    #[test]
    fn trimming_is_opt_in() {
        let csv = " 1 ,2\t, 3\n";
        let config = IngestConfig {
            trim_cells: true,
            ..IngestConfig::headerless(1)
        };
        let frame = ingest_reader(csv.as_bytes(), &config).unwrap();
        assert_eq!(frame.left_matrix, vec![vec!["1".to_string()]]);
        assert_eq!(frame.right_matrix, vec![vec!["2".to_string(), "3".into()]]);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = ingest_file(&path, &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::Open { path: p, .. } if p == path));
    }

    #[tokio::test]
    async fn ingesting_twice_gives_equal_frames() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "header").unwrap();
        for i in 0..10 {
            writeln!(file, "{}", numbered_row(i * 40, i * 40 + 31)).unwrap();
        }
        file.flush().unwrap();

        let first = ingest(file.path(), IngestConfig::default()).await.unwrap();
        let second = ingest(file.path(), IngestConfig::default()).await.unwrap();

        assert_eq!(first.row_count(), 10);
        assert_eq!(first, second);
    }
}
