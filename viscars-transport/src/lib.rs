//! Transport layer for the VISCA protocol
//!
//! Provides the byte-pipe abstraction the protocol engine drives. The
//! transport knows nothing about framing; it moves raw bytes with a
//! bounded-wait read.

pub mod error;
pub mod serial;

pub use error::{Error, Result};
pub use serial::SerialTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Transport trait for different byte-stream links
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the link
    async fn connect(&mut self) -> Result<()>;

    /// Close the link
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if the link is open
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive raw bytes, waiting at most `timeout`
    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut>;

    /// Human-readable endpoint identifier
    fn endpoint(&self) -> String;
}
