use crate::error::MonitorError;

use super::state::DeviceDescriptor;

/// Decides whether a port listing contains the target microcontroller.
#[derive(Debug, Clone)]
pub struct TargetMatcher {
    /// Stored lowercased.
    needle: String,
    treat_empty_as_absent: bool,
}

impl TargetMatcher {
    pub fn new(target_manufacturer: &str, treat_empty_as_absent: bool) -> Self {
        Self {
            needle: target_manufacturer.to_lowercase(),
            treat_empty_as_absent,
        }
    }

    pub fn target(&self) -> &str {
        &self.needle
    }

    /// True iff some descriptor's manufacturer hint contains the target,
    /// ignoring case. An empty listing is an error unless the policy says to
    /// read it as "not attached".
    pub fn match_target(&self, devices: &[DeviceDescriptor]) -> Result<bool, MonitorError> {
        if devices.is_empty() {
            return if self.treat_empty_as_absent {
                Ok(false)
            } else {
                Err(MonitorError::EmptyPortList)
            };
        }

        Ok(devices
            .iter()
            .any(|device| device.manufacturer_hint.to_lowercase().contains(&self.needle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(path: &str, manufacturer: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(path, manufacturer)
    }

    #[test]
    fn matches_manufacturer_case_insensitively() {
        let matcher = TargetMatcher::new("arduino", true);
        let devices = vec![port("/dev/x", "Arduino LLC")];
        assert_eq!(matcher.match_target(&devices), Ok(true));

        let upper = TargetMatcher::new("ARDUINO", true);
        let devices = vec![port("COM3", "arduino srl (www.arduino.org)")];
        assert_eq!(upper.match_target(&devices), Ok(true));
    }

    #[test]
    fn any_matching_port_is_enough() {
        let matcher = TargetMatcher::new("arduino", true);
        let devices = vec![
            port("/dev/ttyS0", ""),
            port("/dev/ttyUSB0", "FTDI"),
            port("/dev/ttyACM0", "Arduino (www.arduino.cc)"),
        ];
        assert_eq!(matcher.match_target(&devices), Ok(true));
    }

    #[test]
    fn no_matching_port_is_absent() {
        let matcher = TargetMatcher::new("arduino", false);
        let devices = vec![port("/dev/ttyS0", ""), port("/dev/ttyUSB0", "Silicon Labs")];
        assert_eq!(matcher.match_target(&devices), Ok(false));
    }

    #[test]
    fn empty_listing_follows_policy() {
        let lenient = TargetMatcher::new("arduino", true);
        assert_eq!(lenient.match_target(&[]), Ok(false));

        let strict = TargetMatcher::new("arduino", false);
        assert_eq!(strict.match_target(&[]), Err(MonitorError::EmptyPortList));
    }
}
