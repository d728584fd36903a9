use serialport::SerialPortType;

use crate::error::MonitorError;

use super::state::DeviceDescriptor;

/// Source of serial port listings. Implementations may block; the poll loop
/// always calls them from a blocking worker.
pub trait DeviceEnumerator: Send + Sync + 'static {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, MonitorError>;
}

/// Lists the host's serial ports through the `serialport` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialPortEnumerator;

impl DeviceEnumerator for SerialPortEnumerator {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, MonitorError> {
        let ports = serialport::available_ports()
            .map_err(|err| MonitorError::Enumeration(err.to_string()))?;

        Ok(ports
            .into_iter()
            .map(|port| {
                let manufacturer_hint = match port.port_type {
                    SerialPortType::UsbPort(info) => info.manufacturer.unwrap_or_default(),
                    _ => String::new(),
                };
                DeviceDescriptor::new(port.port_name, manufacturer_hint)
            })
            .collect())
    }
}
