#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod controller;
pub mod outcome;
pub mod request;
pub mod runner;

pub use config::CaptureConfig;
pub use controller::CaptureOrchestrator;
pub use outcome::{CaptureOutcome, CaptureReport};
pub use request::{default_download_dir, CaptureRequest};
