//! Protocol constants

/// Frame terminator byte
pub const TERMINATOR: u8 = 0xFF;

/// High bit that every VISCA address byte carries
pub const HEADER_FLAG: u8 = 0x80;

/// Recipient nibble used for broadcast packets
pub const BROADCAST_NIBBLE: u8 = 0x08;

/// Maximum frame size on the wire (header + payload + terminator)
pub const MAX_FRAME_SIZE: usize = 16;

/// Maximum payload size between header and terminator
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - 2;

/// Lowest assignable camera address
pub const MIN_ADDRESS: u8 = 1;

/// Highest assignable camera address
pub const MAX_ADDRESS: u8 = 7;

/// Command sockets most cameras expose before the info inquiry reports
/// the real count
pub const DEFAULT_SOCKETS: u8 = 2;

/// Highest socket number encodable in a reply nibble
pub const MAX_SOCKETS: u8 = 15;

/// Highest zoom speed accepted by the speed-qualified zoom commands
pub const ZOOM_SPEED_MAX: u8 = 7;

/// Optical zoom range of the modeled device family
pub const OPTICAL_ZOOM_MAX: u16 = 32768;
