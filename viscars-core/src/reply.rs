//! Inbound reply classification
//!
//! Cameras answer with four frame shapes:
//!
//! ```text
//! ACK           x0 4y FF        y = socket accepting the command
//! Completion    x0 5y FF        y = socket that finished (0 = socketless)
//! Inquiry reply x0 50 .. FF     data bytes after the 0x50
//! Error         x0 6y zz FF     zz = device error code
//! ```
//!
//! plus the broadcast address-assignment echo `88 30 0x FF`.

use bytes::Bytes;
use std::fmt;

use crate::{
    error::{Error, Result},
    packet::Packet,
};

/// Error codes reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceError {
    /// Frame exceeded the length limit
    MessageLength = 0x01,

    /// Command bytes were not understood
    Syntax = 0x02,

    /// No room in the command buffer
    BufferFull = 0x03,

    /// Command was canceled by IF_Clear
    Canceled = 0x04,

    /// Cancel named a socket with nothing pending
    NoSocket = 0x05,

    /// Command valid but not executable in the current mode
    NotExecutable = 0x41,
}

impl DeviceError {
    /// Get error name
    pub fn name(self) -> &'static str {
        match self {
            Self::MessageLength => "message length error",
            Self::Syntax => "syntax error",
            Self::BufferFull => "command buffer full",
            Self::Canceled => "command canceled",
            Self::NoSocket => "no socket",
            Self::NotExecutable => "command not executable",
        }
    }
}

impl TryFrom<u8> for DeviceError {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(Self::MessageLength),
            0x02 => Ok(Self::Syntax),
            0x03 => Ok(Self::BufferFull),
            0x04 => Ok(Self::Canceled),
            0x05 => Ok(Self::NoSocket),
            0x41 => Ok(Self::NotExecutable),
            _ => Err(Error::UnknownErrorCode(value)),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), *self as u8)
    }
}

/// A classified inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Command accepted, processing asynchronously on a socket
    Ack { socket: u8 },

    /// Command (or IF_Clear) finished; socket 0 means socketless
    Completion { socket: u8 },

    /// Inquiry finished, carrying the queried data
    InquiryReply { payload: Bytes },

    /// Device rejected or aborted a command
    Error { socket: u8, code: DeviceError },

    /// Broadcast echo of AddressSet carrying the next free address
    AddressAssigned { address: u8 },
}

impl Reply {
    /// Classify a decoded packet
    ///
    /// # Errors
    ///
    /// Returns an error when the payload does not match any reply shape;
    /// this never panics regardless of input.
    pub fn parse(packet: &Packet) -> Result<Self> {
        let payload = &packet.payload;
        let first = *payload
            .first()
            .ok_or(Error::MalformedReply("empty reply payload"))?;

        match first >> 4 {
            0x4 => {
                if payload.len() != 1 {
                    return Err(Error::MalformedReply("trailing bytes after ack"));
                }
                Ok(Self::Ack {
                    socket: first & 0x0F,
                })
            }
            0x5 => {
                let socket = first & 0x0F;
                if payload.len() == 1 {
                    Ok(Self::Completion { socket })
                } else if socket == 0 {
                    Ok(Self::InquiryReply {
                        payload: packet.payload.slice(1..),
                    })
                } else {
                    Err(Error::MalformedReply("data on a socketed completion"))
                }
            }
            0x6 => {
                if payload.len() != 2 {
                    return Err(Error::MalformedReply("error reply without code byte"));
                }
                Ok(Self::Error {
                    socket: first & 0x0F,
                    code: DeviceError::try_from(payload[1])?,
                })
            }
            0x3 => {
                if payload.len() != 2 {
                    return Err(Error::MalformedReply("short address-set echo"));
                }
                Ok(Self::AddressAssigned {
                    address: payload[1],
                })
            }
            _ => Err(Error::UnknownReply(first)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn reply_packet(frame: &[u8]) -> Packet {
        Packet::decode(frame).unwrap()
    }

    #[test]
    fn test_parse_ack() {
        let reply = Reply::parse(&reply_packet(&[0x90, 0x41, 0xFF])).unwrap();
        assert_eq!(reply, Reply::Ack { socket: 1 });

        let reply = Reply::parse(&reply_packet(&[0x90, 0x42, 0xFF])).unwrap();
        assert_eq!(reply, Reply::Ack { socket: 2 });
    }

    #[test]
    fn test_parse_completion() {
        let reply = Reply::parse(&reply_packet(&[0x90, 0x51, 0xFF])).unwrap();
        assert_eq!(reply, Reply::Completion { socket: 1 });

        // IF_Clear answers with a socketless completion
        let reply = Reply::parse(&reply_packet(&[0x90, 0x50, 0xFF])).unwrap();
        assert_eq!(reply, Reply::Completion { socket: 0 });
    }

    #[test]
    fn test_parse_inquiry_reply() {
        let reply = Reply::parse(&reply_packet(&[0x90, 0x50, 0x01, 0x02, 0x03, 0x04, 0xFF]))
            .unwrap();

        match reply {
            Reply::InquiryReply { payload } => {
                assert_eq!(&payload[..], &[0x01, 0x02, 0x03, 0x04]);
            }
            other => panic!("expected inquiry reply, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error() {
        let reply = Reply::parse(&reply_packet(&[0x90, 0x60, 0x02, 0xFF])).unwrap();
        assert_eq!(
            reply,
            Reply::Error {
                socket: 0,
                code: DeviceError::Syntax
            }
        );

        let reply = Reply::parse(&reply_packet(&[0x90, 0x61, 0x03, 0xFF])).unwrap();
        assert_eq!(
            reply,
            Reply::Error {
                socket: 1,
                code: DeviceError::BufferFull
            }
        );
    }

    #[test]
    fn test_parse_address_assigned() {
        let reply = Reply::parse(&reply_packet(&[0x88, 0x30, 0x02, 0xFF])).unwrap();
        assert_eq!(reply, Reply::AddressAssigned { address: 2 });
    }

    #[test]
    fn test_parse_unknown_error_code() {
        let result = Reply::parse(&reply_packet(&[0x90, 0x60, 0x7F, 0xFF]));
        assert!(matches!(result, Err(Error::UnknownErrorCode(0x7F))));
    }

    #[test]
    fn test_parse_malformed_shapes() {
        // Data bytes after a socketed completion
        let result = Reply::parse(&reply_packet(&[0x90, 0x51, 0x01, 0xFF]));
        assert!(matches!(result, Err(Error::MalformedReply(_))));

        // Error reply missing its code byte
        let result = Reply::parse(&reply_packet(&[0x90, 0x61, 0xFF]));
        assert!(matches!(result, Err(Error::MalformedReply(_))));

        // Unrecognized discriminator
        let result = Reply::parse(&reply_packet(&[0x90, 0x71, 0xFF]));
        assert!(matches!(result, Err(Error::UnknownReply(0x71))));
    }

    proptest! {
        // Any decodable frame must classify to Ok or Err without panicking
        #[test]
        fn parse_never_panics(payload in proptest::collection::vec(any::<u8>(), 0..=14)) {
            let mut frame = vec![0x90];
            frame.extend_from_slice(&payload);
            frame.push(0xFF);
            if let Ok(packet) = Packet::decode(&frame) {
                let _ = Reply::parse(&packet);
            }
        }
    }
}
