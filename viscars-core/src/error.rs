//! Error types for viscars-core

/// Result type alias for core protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame is too short to be valid
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// Frame does not end with the 0xFF terminator
    #[error("Missing 0xFF terminator")]
    MissingTerminator,

    /// Header byte is not a valid VISCA address byte
    #[error("Invalid header byte: 0x{0:02X}")]
    InvalidHeader(u8),

    /// Payload exceeds the VISCA frame limit
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Camera address outside 1-7
    #[error("Invalid camera address: {0} (must be 1-7)")]
    InvalidAddress(u8),

    /// Reply discriminator byte is not a known reply kind
    #[error("Unknown reply type: 0x{0:02X}")]
    UnknownReply(u8),

    /// Device error code is not defined by the protocol
    #[error("Unknown device error code: 0x{0:02X}")]
    UnknownErrorCode(u8),

    /// Reply body does not match its declared kind
    #[error("Malformed reply: {0}")]
    MalformedReply(&'static str),

    /// Zoom position nibbles are not a valid 16-bit value
    #[error("Invalid zoom position data: {0}")]
    InvalidZoomData(&'static str),

    /// Socket already has a pending command
    #[error("Socket {socket} is busy with a pending command")]
    SocketBusy {
        socket: u8,
    },

    /// All sockets have pending commands
    #[error("No free socket available")]
    NoFreeSocket,

    /// No pending command tracked on this socket
    #[error("No pending command on socket {socket}")]
    NoPending {
        socket: u8,
    },
}

impl Error {
    /// Check if this error means inbound bytes could not be decoded
    ///
    /// Malformed input is surfaced to the caller for a retry/log decision
    /// and must never take the engine down.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::FrameTooShort { .. }
                | Self::MissingTerminator
                | Self::InvalidHeader(_)
                | Self::PayloadTooLarge { .. }
                | Self::UnknownReply(_)
                | Self::UnknownErrorCode(_)
                | Self::MalformedReply(_)
                | Self::InvalidZoomData(_)
        )
    }
}
