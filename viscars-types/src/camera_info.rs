//! Camera identification structures

use std::fmt;

use crate::error::{Error, Result};

/// Identification data reported by the version inquiry
///
/// The reply payload carries vendor, model and ROM version as big-endian
/// 16-bit values followed by the command socket count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    /// Vendor ID (0x0020 for Sony)
    pub vendor: u16,

    /// Model ID
    pub model: u16,

    /// ROM version
    pub rom_version: u16,

    /// Number of command sockets the device exposes
    pub socket_count: u8,
}

impl CameraInfo {
    /// Version-inquiry payload length
    pub const PAYLOAD_SIZE: usize = 7;

    /// Parse the version-inquiry data payload
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is shorter than the 7 bytes the
    /// inquiry defines.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::PAYLOAD_SIZE {
            return Err(Error::Parse(format!(
                "version payload too short: expected {} bytes, got {}",
                Self::PAYLOAD_SIZE,
                payload.len()
            )));
        }

        Ok(Self {
            vendor: u16::from_be_bytes([payload[0], payload[1]]),
            model: u16::from_be_bytes([payload[2], payload[3]]),
            rom_version: u16::from_be_bytes([payload[4], payload[5]]),
            socket_count: payload[6],
        })
    }
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Camera[vendor: 0x{:04X}, model: 0x{:04X}, rom: 0x{:04X}, sockets: {}]",
            self.vendor, self.model, self.rom_version, self.socket_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_payload() {
        let info = CameraInfo::parse(&[0x00, 0x20, 0x04, 0x47, 0x01, 0x06, 0x02]).unwrap();

        assert_eq!(info.vendor, 0x0020);
        assert_eq!(info.model, 0x0447);
        assert_eq!(info.rom_version, 0x0106);
        assert_eq!(info.socket_count, 2);
    }

    #[test]
    fn test_parse_short_payload() {
        let result = CameraInfo::parse(&[0x00, 0x20, 0x04]);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_display() {
        let info = CameraInfo::parse(&[0x00, 0x20, 0x04, 0x47, 0x01, 0x06, 0x02]).unwrap();
        assert_eq!(
            info.to_string(),
            "Camera[vendor: 0x0020, model: 0x0447, rom: 0x0106, sockets: 2]"
        );
    }
}
