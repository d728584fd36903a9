use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// Tunables for the serial connection monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Case-insensitive substring searched for in each port's manufacturer string.
    pub target_manufacturer: String,

    /// Delay between two successful enumerations.
    pub poll_interval_ms: u64,

    /// Upper bound for the exponential backoff after failed enumerations.
    pub max_backoff_ms: u64,

    /// A host query taking longer than this counts as a failed enumeration.
    pub enumeration_timeout_ms: u64,

    /// Read an empty port listing as "not attached" instead of an error.
    pub treat_empty_as_absent: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target_manufacturer: "arduino".into(),
            poll_interval_ms: 500,
            max_backoff_ms: 10_000,
            enumeration_timeout_ms: 5_000,
            treat_empty_as_absent: true,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn enumeration_timeout(&self) -> Duration {
        Duration::from_millis(self.enumeration_timeout_ms)
    }

    /// Delay before the next attempt after `failures` consecutive errors.
    pub fn backoff_delay(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.min(16));
        self.poll_interval()
            .saturating_mul(factor)
            .min(Duration::from_millis(self.max_backoff_ms.max(self.poll_interval_ms)))
    }
}
