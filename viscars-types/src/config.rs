//! Connection configuration

use std::fmt;

/// Serial connection parameters for one camera bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConfig {
    /// Serial device path or name (e.g. `/dev/ttyUSB0`)
    pub port: String,

    /// Baud rate (VISCA default is 9600)
    pub rate: u32,
}

impl CameraConfig {
    pub fn new(port: impl Into<String>, rate: u32) -> Self {
        Self {
            port: port.into(),
            rate,
        }
    }
}

impl fmt::Display for CameraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.port, self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_display() {
        let cfg = CameraConfig::new("/dev/ttyUSB0", 9600);
        assert_eq!(cfg.to_string(), "/dev/ttyUSB0@9600");
    }
}
