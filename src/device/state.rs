use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Disconnected
    }
}

impl ConnectionState {
    pub fn from_matched(matched: bool) -> Self {
        if matched {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

/// One serial port as reported by a single enumeration pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub path: String,
    /// Empty when the port type carries no USB metadata.
    pub manufacturer_hint: String,
}

impl DeviceDescriptor {
    pub fn new(path: impl Into<String>, manufacturer_hint: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            manufacturer_hint: manufacturer_hint.into(),
        }
    }
}

/// Payload published on every confirmed state transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub connected: bool,
}

impl From<ConnectionState> for ConnectionEvent {
    fn from(state: ConnectionState) -> Self {
        Self {
            connected: state.is_connected(),
        }
    }
}

/// Result of a one-shot scan, returned to callers that want the port list too.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub devices: Vec<DeviceDescriptor>,
    pub state: ConnectionState,
}
