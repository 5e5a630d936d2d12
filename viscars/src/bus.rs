//! Protocol engine
//!
//! [`Bus`] owns one transport connection and its [`Interface`] socket
//! table, and sequences each exchange: command send, ack wait, completion
//! wait, or inquiry send and reply wait. Frames from other devices and
//! late replies on freed sockets are discarded without disturbing pending
//! state.

use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use viscars_core::{
    constants::TERMINATOR, Command, Inquiry, Interface, Packet, PendingState, Reply,
};
use viscars_transport::Transport;

use crate::error::{Error, Result};

/// Default per-read wait bound
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// A bus behind the lock that serializes access to the shared serial link
pub type SharedBus = Arc<Mutex<Bus>>;

/// Protocol engine for one serial bus
pub struct Bus {
    transport: Option<Box<dyn Transport>>,
    iface: Interface,
    rx: BytesMut,
    read_timeout: Duration,
}

impl Bus {
    /// Create a bus with no transport attached yet
    pub fn new() -> Self {
        Self {
            transport: None,
            iface: Interface::new(),
            rx: BytesMut::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set the per-read wait bound
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Wrap the bus for sharing between camera handles
    pub fn shared(self) -> SharedBus {
        Arc::new(Mutex::new(self))
    }

    /// Check if a transport is attached and open
    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_connected())
    }

    /// Set the bus broadcast flag
    pub fn set_broadcast(&mut self, broadcast: bool) {
        self.iface.set_broadcast(broadcast);
    }

    /// Adopt the socket count reported by the camera info inquiry
    pub fn set_socket_count(&mut self, count: u8) {
        self.iface.set_socket_count(count);
    }

    /// Attach and open a transport, replacing any previous connection state
    pub async fn connect(&mut self, mut transport: Box<dyn Transport>) -> Result<()> {
        transport.connect().await?;

        self.iface = Interface::new();
        self.rx.clear();
        self.transport = Some(transport);

        Ok(())
    }

    /// Close and drop the attached transport
    pub async fn disconnect(&mut self) -> Result<()> {
        self.iface.clear_pending();
        self.rx.clear();

        if let Some(mut transport) = self.transport.take() {
            transport.disconnect().await?;
        }

        Ok(())
    }

    /// Issue a command and wait for its completion
    ///
    /// Sequences `Sent -> Acked -> Completed` against the socket table.
    /// A device error frees the socket and surfaces as [`Error::Device`];
    /// a read timeout frees the socket locally and propagates. No retry
    /// is attempted at this layer.
    pub async fn command(&mut self, address: u8, command: &Command) -> Result<()> {
        let packet = Packet::to_camera(address, command.payload())?;
        let encoded = packet.encode();

        let mut socket = self.iface.allocate()?;
        debug!(%command, address, socket, "sending command");

        if let Err(e) = self.send_bytes(&encoded).await {
            self.iface.release(socket);
            return Err(e);
        }

        loop {
            let packet = match self.read_frame().await {
                Ok(packet) => packet,
                Err(e) => {
                    self.iface.release(socket);
                    return Err(e);
                }
            };

            if packet.sender != address {
                trace!(sender = packet.sender, "discarding frame from other device");
                continue;
            }

            let reply = match Reply::parse(&packet) {
                Ok(reply) => reply,
                Err(e) => {
                    self.iface.release(socket);
                    return Err(e.into());
                }
            };

            match reply {
                Reply::Ack { socket: device } => {
                    if self.iface.state_of(socket) == Some(PendingState::Sent) {
                        socket = match self.iface.mark_acked(socket, device) {
                            Ok(socket) => socket,
                            Err(e) => {
                                self.iface.release(socket);
                                return Err(e.into());
                            }
                        };
                        trace!(socket, "command acked");
                    } else {
                        trace!(socket = device, "discarding stray ack");
                    }
                }
                Reply::Completion { socket: done } => {
                    if done == socket {
                        self.iface.complete(done);
                        debug!(%command, "command completed");
                        return Ok(());
                    }
                    trace!(socket = done, "discarding unmatched completion");
                }
                Reply::Error { socket: failed, code } => {
                    // Syntax-class rejections come back on socket 0
                    if failed == socket || failed == 0 {
                        self.iface.release(socket);
                        warn!(%command, %code, "device rejected command");
                        return Err(Error::Device(code));
                    }
                    trace!(socket = failed, "discarding unmatched error");
                }
                other => trace!(?other, "discarding stray reply"),
            }
        }
    }

    /// Issue an inquiry and wait for its data reply
    pub async fn inquiry(&mut self, address: u8, inquiry: &Inquiry) -> Result<Bytes> {
        let packet = Packet::to_camera(address, inquiry.payload())?;
        let encoded = packet.encode();

        let socket = self.iface.allocate()?;
        debug!(%inquiry, address, "sending inquiry");

        if let Err(e) = self.send_bytes(&encoded).await {
            self.iface.release(socket);
            return Err(e);
        }

        loop {
            let packet = match self.read_frame().await {
                Ok(packet) => packet,
                Err(e) => {
                    self.iface.release(socket);
                    return Err(e);
                }
            };

            if packet.sender != address {
                trace!(sender = packet.sender, "discarding frame from other device");
                continue;
            }

            let reply = match Reply::parse(&packet) {
                Ok(reply) => reply,
                Err(e) => {
                    self.iface.release(socket);
                    return Err(e.into());
                }
            };

            match reply {
                Reply::InquiryReply { payload } => {
                    self.iface.release(socket);
                    debug!(%inquiry, len = payload.len(), "inquiry replied");
                    return Ok(payload);
                }
                Reply::Error { socket: failed, code } => {
                    if failed == 0 || failed == socket {
                        self.iface.release(socket);
                        warn!(%inquiry, %code, "device rejected inquiry");
                        return Err(Error::Device(code));
                    }
                    trace!(socket = failed, "discarding unmatched error");
                }
                other => trace!(?other, "discarding stray reply"),
            }
        }
    }

    /// Assign device addresses over broadcast
    ///
    /// Must complete before any per-device command after a (re)connect.
    /// Returns how many devices took an address.
    pub async fn set_address(&mut self) -> Result<u8> {
        let packet = Packet::broadcast(Command::AddressSet.payload())?;
        debug!("broadcasting AddressSet");

        self.send_bytes(&packet.encode()).await?;

        loop {
            let packet = self.read_frame().await?;

            match Reply::parse(&packet)? {
                Reply::AddressAssigned { address } => {
                    // The echo carries the first unassigned address
                    if !(1..=8).contains(&address) {
                        return Err(Error::UnexpectedReply(format!(
                            "address-set echo out of range: {address}"
                        )));
                    }
                    let cameras = address - 1;
                    debug!(cameras, "bus addressing complete");
                    return Ok(cameras);
                }
                other => trace!(?other, "discarding frame while waiting for address echo"),
            }
        }
    }

    /// Cancel in-flight commands on a device (IF_Clear)
    ///
    /// The device answers with a socketless completion; every locally
    /// pending entry is dropped to match.
    pub async fn clear(&mut self, address: u8) -> Result<()> {
        let packet = Packet::to_camera(address, Command::IfClear.payload())?;
        debug!(address, "sending IF_Clear");

        self.send_bytes(&packet.encode()).await?;

        loop {
            let packet = self.read_frame().await?;

            if packet.sender != address {
                trace!(sender = packet.sender, "discarding frame from other device");
                continue;
            }

            match Reply::parse(&packet)? {
                Reply::Completion { socket: 0 } => {
                    self.iface.clear_pending();
                    debug!(address, "IF_Clear completed");
                    return Ok(());
                }
                Reply::Error { code, .. } => {
                    warn!(%code, "device rejected IF_Clear");
                    return Err(Error::Device(code));
                }
                other => trace!(?other, "discarding frame while waiting for IF_Clear"),
            }
        }
    }

    async fn send_bytes(&mut self, data: &[u8]) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        transport.send(data).await?;
        Ok(())
    }

    /// Assemble the next terminated frame from the byte stream
    ///
    /// The transport is a pure byte pipe; splitting on the 0xFF
    /// terminator happens here.
    async fn read_frame(&mut self) -> Result<Packet> {
        loop {
            if let Some(pos) = self.rx.iter().position(|&b| b == TERMINATOR) {
                let frame = self.rx.split_to(pos + 1);
                let packet = Packet::decode(&frame)?;
                trace!(?packet, "frame received");
                return Ok(packet);
            }

            let wait = self.read_timeout;
            let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
            let chunk = transport.receive(wait).await?;
            self.rx.extend_from_slice(&chunk);
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
