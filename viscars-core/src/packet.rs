//! VISCA packet structure and encoding/decoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    constants::{
        BROADCAST_NIBBLE, HEADER_FLAG, MAX_ADDRESS, MAX_PAYLOAD_SIZE, MIN_ADDRESS, TERMINATOR,
    },
    error::{Error, Result},
};

/// Packet recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// A single addressed device (controller itself is address 0)
    Camera(u8),

    /// Every device on the bus
    Broadcast,
}

impl Recipient {
    fn nibble(self) -> u8 {
        match self {
            Self::Camera(addr) => addr,
            Self::Broadcast => BROADCAST_NIBBLE,
        }
    }
}

/// VISCA protocol packet
///
/// # Frame Structure
///
/// ```text
/// ┌──────────────────────────────┬─────────────┬────────────┐
/// │            Header            │   Payload   │ Terminator │
/// │            1 byte            │  1-14 bytes │   1 byte   │
/// │ 1 │ sender (3b) │ recip (4b) │   (bytes)   │    0xFF    │
/// └──────────────────────────────┴─────────────┴────────────┘
/// ```
///
/// The header always carries the 0x80 bit. Recipient nibble 8 means
/// broadcast; 0-7 address individual devices (0 being the controller).
///
/// # Examples
///
/// ```
/// use viscars_core::{Packet, Recipient};
///
/// // Zoom stop addressed to camera 1
/// let packet = Packet::to_camera(1, vec![0x01, 0x04, 0x07, 0x00]).unwrap();
/// let encoded = packet.encode();
/// assert_eq!(encoded[0], 0x81);
/// assert_eq!(*encoded.last().unwrap(), 0xFF);
///
/// let decoded = Packet::decode(&encoded).unwrap();
/// assert_eq!(decoded.recipient, Recipient::Camera(1));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    /// Sender address (0 for the controller)
    pub sender: u8,

    /// Recipient address or broadcast
    pub recipient: Recipient,

    /// Payload between header and terminator
    pub payload: Bytes,
}

impl Packet {
    /// Smallest decodable frame: header + terminator
    pub const MIN_FRAME_SIZE: usize = 2;

    /// Create a controller-to-camera packet
    ///
    /// # Errors
    ///
    /// Returns an error if the address is outside 1-7 or the payload
    /// exceeds the frame limit.
    pub fn to_camera(address: u8, payload: impl Into<Bytes>) -> Result<Self> {
        if !(MIN_ADDRESS..=MAX_ADDRESS).contains(&address) {
            return Err(Error::InvalidAddress(address));
        }
        Self::checked(0, Recipient::Camera(address), payload.into())
    }

    /// Create a controller-to-all broadcast packet
    pub fn broadcast(payload: impl Into<Bytes>) -> Result<Self> {
        Self::checked(0, Recipient::Broadcast, payload.into())
    }

    fn checked(sender: u8, recipient: Recipient, payload: Bytes) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Self {
            sender,
            recipient,
            payload,
        })
    }

    /// Check if this packet is addressed to every device
    pub fn is_broadcast(&self) -> bool {
        self.recipient == Recipient::Broadcast
    }

    /// Encode packet to a wire frame
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(2 + self.payload.len());

        buf.put_u8(HEADER_FLAG | (self.sender << 4) | self.recipient.nibble());
        buf.put_slice(&self.payload);
        buf.put_u8(TERMINATOR);

        buf
    }

    /// Decode a terminated frame
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The frame is shorter than header + terminator
    /// - The final byte is not 0xFF
    /// - The header byte lacks the 0x80 bit or carries an invalid
    ///   recipient nibble
    /// - The payload exceeds the frame limit
    ///
    /// Malformed input is always reported as an error, never a panic.
    pub fn decode(frame: &[u8]) -> Result<Self> {
        if frame.len() < Self::MIN_FRAME_SIZE {
            return Err(Error::FrameTooShort {
                expected: Self::MIN_FRAME_SIZE,
                actual: frame.len(),
            });
        }

        if frame[frame.len() - 1] != TERMINATOR {
            return Err(Error::MissingTerminator);
        }

        let header = frame[0];
        if header & HEADER_FLAG == 0 {
            return Err(Error::InvalidHeader(header));
        }

        let sender = (header >> 4) & 0x07;
        let recipient = match header & 0x0F {
            BROADCAST_NIBBLE => Recipient::Broadcast,
            nibble if nibble <= MAX_ADDRESS => Recipient::Camera(nibble),
            _ => return Err(Error::InvalidHeader(header)),
        };

        let payload = Bytes::copy_from_slice(&frame[1..frame.len() - 1]);
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self {
            sender,
            recipient,
            payload,
        })
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("payload", &format!("{:02X?}", &self.payload[..]))
            .finish()
    }
}
