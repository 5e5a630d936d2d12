//! Serial transport
//!
//! VISCA runs over RS-232/RS-422 at 8N1. The stream is opened lazily on
//! `connect` so a transport value can be built before the port exists.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace, warn};

use crate::{error::*, Transport};

/// Read buffer size; VISCA frames are at most 16 bytes but a read may
/// return several queued replies at once
const READ_BUF_SIZE: usize = 256;

/// Serial transport for VISCA devices
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    stream: Option<SerialStream>,
}

impl SerialTransport {
    /// Create new serial transport
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            stream: None,
        }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Opening {} at {} baud...", self.path, self.baud_rate);

        let stream = tokio_serial::new(&self.path, self.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|source| Error::OpenFailed {
                path: self.path.clone(),
                source,
            })?;

        debug!("Opened {}", self.path);

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Closing {}...", self.path);

            // Flush what we can; the port itself closes on drop
            let _ = stream.shutdown().await;
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes: {:02X?}", data.len(), data);

        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    async fn receive(&mut self, wait: Duration) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(READ_BUF_SIZE);

        let n = timeout(wait, stream.read_buf(&mut buf))
            .await
            .map_err(|_| Error::ReadTimeout)?
            .map_err(Error::Io)?;

        if n == 0 {
            warn!("Serial port {} returned EOF", self.path);
            return Err(Error::ConnectionClosed);
        }

        trace!("Received {} bytes: {:02X?}", n, &buf[..n]);

        Ok(buf)
    }

    fn endpoint(&self) -> String {
        format!("{}@{}", self.path, self.baud_rate)
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Serial transport dropped while still connected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serial_transport_create() {
        let transport = SerialTransport::new("/dev/ttyUSB0", 9600);
        assert!(!transport.is_connected());
        assert_eq!(transport.endpoint(), "/dev/ttyUSB0@9600");
    }

    #[tokio::test]
    async fn test_serial_transport_missing_port() {
        let mut transport = SerialTransport::new("/dev/viscars-does-not-exist", 9600);

        let result = transport.connect().await;
        assert!(matches!(result, Err(Error::OpenFailed { .. })));
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let mut transport = SerialTransport::new("/dev/ttyUSB0", 9600);

        let result = transport.send(&[0x81, 0xFF]).await;
        assert!(matches!(result, Err(Error::NotConnected)));

        let result = transport.receive(Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }
}
