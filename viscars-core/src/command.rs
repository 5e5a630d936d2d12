//! VISCA command and inquiry definitions
//!
//! Payloads here are the bytes between the address header and the 0xFF
//! terminator; framing is done by [`Packet`](crate::Packet).

use bytes::Bytes;
use std::fmt;

use crate::{
    constants::ZOOM_SPEED_MAX,
    error::{Error, Result},
};

/// Zoom speed for the speed-qualified zoom commands
///
/// Valid range is 0-7; out-of-range input is clamped at construction so
/// an invalid nibble can never reach the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomSpeed(u8);

impl ZoomSpeed {
    /// Fastest non-variable speed setting
    pub const MAX: Self = Self(ZOOM_SPEED_MAX);

    /// Create a zoom speed, clamping to the valid 0-7 range
    pub fn new(speed: u8) -> Self {
        Self(speed.min(ZOOM_SPEED_MAX))
    }

    /// Raw nibble value
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Digital zoom mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DZoomMode {
    On = 0x02,
    Off = 0x03,
}

/// Protocol commands (ack/completion semantics)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop any zoom movement
    ZoomStop,

    /// Zoom in at the standard speed
    ZoomTele,

    /// Zoom out at the standard speed
    ZoomWide,

    /// Zoom in at an explicit speed
    ZoomTeleSpeed(ZoomSpeed),

    /// Zoom out at an explicit speed
    ZoomWideSpeed(ZoomSpeed),

    /// Move zoom directly to a position
    ZoomDirect(u16),

    /// Switch digital zoom on or off
    DZoom(DZoomMode),

    /// Assign device addresses (broadcast only)
    AddressSet,

    /// Cancel all pending commands on the device
    IfClear,
}

impl Command {
    /// Encode the command payload
    pub fn payload(&self) -> Bytes {
        match *self {
            Self::ZoomStop => Bytes::from_static(&[0x01, 0x04, 0x07, 0x00]),
            Self::ZoomTele => Bytes::from_static(&[0x01, 0x04, 0x07, 0x02]),
            Self::ZoomWide => Bytes::from_static(&[0x01, 0x04, 0x07, 0x03]),
            Self::ZoomTeleSpeed(speed) => {
                Bytes::from(vec![0x01, 0x04, 0x07, 0x20 | speed.value()])
            }
            Self::ZoomWideSpeed(speed) => {
                Bytes::from(vec![0x01, 0x04, 0x07, 0x30 | speed.value()])
            }
            Self::ZoomDirect(position) => {
                let [p, q, r, s] = pack_nibbles(position);
                Bytes::from(vec![0x01, 0x04, 0x47, p, q, r, s])
            }
            Self::DZoom(mode) => Bytes::from(vec![0x01, 0x04, 0x06, mode as u8]),
            Self::AddressSet => Bytes::from_static(&[0x30, 0x01]),
            Self::IfClear => Bytes::from_static(&[0x01, 0x00, 0x01]),
        }
    }

    /// Get command name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ZoomStop => "CAM_Zoom_Stop",
            Self::ZoomTele => "CAM_Zoom_Tele",
            Self::ZoomWide => "CAM_Zoom_Wide",
            Self::ZoomTeleSpeed(_) => "CAM_Zoom_Tele_Speed",
            Self::ZoomWideSpeed(_) => "CAM_Zoom_Wide_Speed",
            Self::ZoomDirect(_) => "CAM_Zoom_Direct",
            Self::DZoom(_) => "CAM_DZoom",
            Self::AddressSet => "AddressSet",
            Self::IfClear => "IF_Clear",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Protocol inquiries (single data reply, no ack)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inquiry {
    /// Current zoom position
    ZoomPos,

    /// Vendor, model, ROM version and socket count
    Version,
}

impl Inquiry {
    /// Encode the inquiry payload
    pub fn payload(&self) -> Bytes {
        match self {
            Self::ZoomPos => Bytes::from_static(&[0x09, 0x04, 0x47]),
            Self::Version => Bytes::from_static(&[0x09, 0x00, 0x02]),
        }
    }

    /// Get inquiry name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ZoomPos => "CAM_ZoomPosInq",
            Self::Version => "CAM_VersionInq",
        }
    }
}

impl fmt::Display for Inquiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split a 16-bit value into the 4 low nibbles used for zoom positions
pub fn pack_nibbles(value: u16) -> [u8; 4] {
    [
        ((value >> 12) & 0x0F) as u8,
        ((value >> 8) & 0x0F) as u8,
        ((value >> 4) & 0x0F) as u8,
        (value & 0x0F) as u8,
    ]
}

/// Reassemble a 16-bit value from 4 low nibbles
///
/// # Errors
///
/// Returns an error if the slice is not exactly 4 bytes or any byte has
/// its high nibble set.
pub fn unpack_nibbles(data: &[u8]) -> Result<u16> {
    if data.len() != 4 {
        return Err(Error::InvalidZoomData("expected 4 nibble bytes"));
    }
    if data.iter().any(|&b| b & 0xF0 != 0) {
        return Err(Error::InvalidZoomData("high nibble set"));
    }

    Ok(((data[0] as u16) << 12)
        | ((data[1] as u16) << 8)
        | ((data[2] as u16) << 4)
        | data[3] as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_zoom_command_payloads() {
        assert_eq!(&Command::ZoomStop.payload()[..], &[0x01, 0x04, 0x07, 0x00]);
        assert_eq!(&Command::ZoomTele.payload()[..], &[0x01, 0x04, 0x07, 0x02]);
        assert_eq!(&Command::ZoomWide.payload()[..], &[0x01, 0x04, 0x07, 0x03]);
    }

    #[test]
    fn test_speed_qualified_payloads() {
        let tele = Command::ZoomTeleSpeed(ZoomSpeed::MAX);
        assert_eq!(&tele.payload()[..], &[0x01, 0x04, 0x07, 0x27]);

        let wide = Command::ZoomWideSpeed(ZoomSpeed::new(3));
        assert_eq!(&wide.payload()[..], &[0x01, 0x04, 0x07, 0x33]);
    }

    #[test]
    fn test_zoom_speed_clamps() {
        assert_eq!(ZoomSpeed::new(12).value(), 7);
        assert_eq!(ZoomSpeed::new(7).value(), 7);
        assert_eq!(ZoomSpeed::new(0).value(), 0);
    }

    #[test]
    fn test_zoom_direct_payload() {
        let cmd = Command::ZoomDirect(0x1234);
        assert_eq!(
            &cmd.payload()[..],
            &[0x01, 0x04, 0x47, 0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn test_dzoom_payload() {
        assert_eq!(
            &Command::DZoom(DZoomMode::Off).payload()[..],
            &[0x01, 0x04, 0x06, 0x03]
        );
        assert_eq!(
            &Command::DZoom(DZoomMode::On).payload()[..],
            &[0x01, 0x04, 0x06, 0x02]
        );
    }

    #[test]
    fn test_bus_command_payloads() {
        assert_eq!(&Command::AddressSet.payload()[..], &[0x30, 0x01]);
        assert_eq!(&Command::IfClear.payload()[..], &[0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_inquiry_payloads() {
        assert_eq!(&Inquiry::ZoomPos.payload()[..], &[0x09, 0x04, 0x47]);
        assert_eq!(&Inquiry::Version.payload()[..], &[0x09, 0x00, 0x02]);
    }

    #[test]
    fn test_unpack_rejects_bad_input() {
        assert!(unpack_nibbles(&[0x01, 0x02, 0x03]).is_err());
        assert!(unpack_nibbles(&[0x01, 0x02, 0x03, 0x04, 0x05]).is_err());
        assert!(unpack_nibbles(&[0x10, 0x02, 0x03, 0x04]).is_err());
    }

    proptest! {
        #[test]
        fn nibbles_roundtrip(value in any::<u16>()) {
            let packed = pack_nibbles(value);
            prop_assert_eq!(unpack_nibbles(&packed).unwrap(), value);
        }
    }
}
