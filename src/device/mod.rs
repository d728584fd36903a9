#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod controller;
pub mod enumerator;
pub mod loop_worker;
pub mod matcher;
pub mod state;

pub use config::MonitorConfig;
pub use controller::ConnectionMonitor;
pub use enumerator::{DeviceEnumerator, SerialPortEnumerator};
pub use matcher::TargetMatcher;
pub use state::{ConnectionEvent, ConnectionState, DeviceDescriptor, ScanReport};
