//! # viscars-core
//!
//! Core VISCA protocol implementation for serial PTZ cameras.
//!
//! This crate provides the low-level protocol primitives:
//! - Packet framing and encoding/decoding
//! - Command and inquiry definitions
//! - Reply classification (ack/completion/inquiry/error)
//! - Socket-table state tracking
//! - Protocol constants

pub mod command;
pub mod constants;
pub mod error;
pub mod interface;
pub mod packet;
pub mod reply;

pub use command::{Command, DZoomMode, Inquiry, ZoomSpeed};
pub use error::{Error, Result};
pub use interface::{Interface, PendingCommand, PendingState};
pub use packet::{Packet, Recipient};
pub use reply::{DeviceError, Reply};

/// Protocol version information
pub const PROTOCOL_VERSION: &str = "1.0";

/// Maximum frame size on the wire
pub const MAX_FRAME_SIZE: usize = constants::MAX_FRAME_SIZE;
