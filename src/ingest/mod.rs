#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod frame;
pub mod reader;

pub use config::IngestConfig;
pub use frame::{Matrix, PressureFrame};
pub use reader::{ingest, ingest_file, ingest_reader};
