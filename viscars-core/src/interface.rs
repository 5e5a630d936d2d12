//! Socket-table state tracking for one bus connection
//!
//! The device correlates a command with its ack/completion/error through a
//! socket number. [`Interface`] mirrors that bookkeeping on the controller
//! side: one pending entry per socket, allocated when a command is sent and
//! freed on completion, error, or timeout.

use std::collections::HashMap;
use std::time::Instant;

use tracing::trace;

use crate::{
    constants::{DEFAULT_SOCKETS, MAX_SOCKETS},
    error::{Error, Result},
};

/// Lifecycle of a pending command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingState {
    /// Written to the wire, no ack seen yet
    Sent,

    /// Ack observed, waiting for completion
    Acked,
}

/// A command awaiting its completion
#[derive(Debug, Clone)]
pub struct PendingCommand {
    /// Socket the entry is keyed under
    pub socket: u8,

    /// Current lifecycle state
    pub state: PendingState,

    /// When the command was written
    pub issued_at: Instant,
}

/// Per-connection bus context
///
/// Owns the broadcast flag, the outstanding-command table and the next-free
/// socket counter. Not thread-safe on its own; the engine serializes access
/// behind its bus lock.
#[derive(Debug)]
pub struct Interface {
    broadcast: bool,
    socket_count: u8,
    next_socket: u8,
    pending: HashMap<u8, PendingCommand>,
}

impl Interface {
    /// Create a fresh context assuming the default two command sockets
    pub fn new() -> Self {
        Self {
            broadcast: false,
            socket_count: DEFAULT_SOCKETS,
            next_socket: 1,
            pending: HashMap::new(),
        }
    }

    /// Get the broadcast flag
    pub fn broadcast(&self) -> bool {
        self.broadcast
    }

    /// Set the broadcast flag
    pub fn set_broadcast(&mut self, broadcast: bool) {
        self.broadcast = broadcast;
    }

    /// Sockets currently assumed available on the device
    pub fn socket_count(&self) -> u8 {
        self.socket_count
    }

    /// Adopt the socket count reported by the info inquiry
    pub fn set_socket_count(&mut self, count: u8) {
        self.socket_count = count.clamp(1, MAX_SOCKETS);
    }

    /// Number of outstanding commands
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// State of the entry on a socket, if any
    pub fn state_of(&self, socket: u8) -> Option<PendingState> {
        self.pending.get(&socket).map(|p| p.state)
    }

    /// Check if a socket has a pending entry
    pub fn is_busy(&self, socket: u8) -> bool {
        self.pending.contains_key(&socket)
    }

    /// Allocate the next free socket for an outgoing command
    ///
    /// # Errors
    ///
    /// Returns an error when every socket already has a pending entry.
    pub fn allocate(&mut self) -> Result<u8> {
        for offset in 0..self.socket_count {
            let socket = (self.next_socket + offset - 1) % self.socket_count + 1;
            if !self.pending.contains_key(&socket) {
                self.pending.insert(
                    socket,
                    PendingCommand {
                        socket,
                        state: PendingState::Sent,
                        issued_at: Instant::now(),
                    },
                );
                self.next_socket = socket % self.socket_count + 1;
                trace!(socket, "allocated command socket");
                return Ok(socket);
            }
        }
        Err(Error::NoFreeSocket)
    }

    /// Record an ack, moving the entry from `Sent` to `Acked`
    ///
    /// The device assigns the real socket in the ack; when it differs from
    /// the locally allocated one the entry is re-keyed. Returns the socket
    /// the entry now lives under.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is pending on `local`, or the
    /// device-assigned socket already has its own pending entry.
    pub fn mark_acked(&mut self, local: u8, device: u8) -> Result<u8> {
        if local != device && self.pending.contains_key(&device) {
            return Err(Error::SocketBusy { socket: device });
        }

        let mut entry = self
            .pending
            .remove(&local)
            .ok_or(Error::NoPending { socket: local })?;

        entry.socket = device;
        entry.state = PendingState::Acked;
        self.pending.insert(device, entry);

        Ok(device)
    }

    /// Free a socket after its completion arrived
    ///
    /// Returns whether a pending entry was actually matched; an unmatched
    /// completion is the caller's cue to discard a stray reply.
    pub fn complete(&mut self, socket: u8) -> bool {
        let matched = self.pending.remove(&socket).is_some();
        trace!(socket, matched, "completion observed");
        matched
    }

    /// Free a socket without a completion (error reply or local timeout)
    pub fn release(&mut self, socket: u8) -> bool {
        self.pending.remove(&socket).is_some()
    }

    /// Drop every pending entry (IF_Clear semantics)
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_interface() {
        let iface = Interface::new();
        assert!(!iface.broadcast());
        assert_eq!(iface.socket_count(), 2);
        assert_eq!(iface.pending_len(), 0);
    }

    #[test]
    fn test_allocate_cycles_sockets() {
        let mut iface = Interface::new();

        let first = iface.allocate().unwrap();
        assert_eq!(first, 1);
        assert_eq!(iface.state_of(1), Some(PendingState::Sent));

        let second = iface.allocate().unwrap();
        assert_eq!(second, 2);

        assert!(matches!(iface.allocate(), Err(Error::NoFreeSocket)));
    }

    #[test]
    fn test_at_most_one_pending_per_socket() {
        let mut iface = Interface::new();
        iface.set_socket_count(1);

        let socket = iface.allocate().unwrap();
        assert!(iface.is_busy(socket));
        assert!(matches!(iface.allocate(), Err(Error::NoFreeSocket)));

        // Releasing frees the slot again
        assert!(iface.release(socket));
        assert_eq!(iface.allocate().unwrap(), socket);
    }

    #[test]
    fn test_ack_transitions_state() {
        let mut iface = Interface::new();
        let socket = iface.allocate().unwrap();

        let acked = iface.mark_acked(socket, socket).unwrap();
        assert_eq!(acked, socket);
        assert_eq!(iface.state_of(socket), Some(PendingState::Acked));
    }

    #[test]
    fn test_ack_rekeys_to_device_socket() {
        let mut iface = Interface::new();
        let local = iface.allocate().unwrap();
        assert_eq!(local, 1);

        let device = iface.mark_acked(local, 2).unwrap();
        assert_eq!(device, 2);
        assert!(!iface.is_busy(1));
        assert_eq!(iface.state_of(2), Some(PendingState::Acked));
    }

    #[test]
    fn test_ack_rejects_busy_device_socket() {
        let mut iface = Interface::new();
        let first = iface.allocate().unwrap();
        let second = iface.allocate().unwrap();
        assert_ne!(first, second);

        let result = iface.mark_acked(first, second);
        assert!(matches!(result, Err(Error::SocketBusy { socket }) if socket == second));

        // The original entry is untouched by the rejected transition
        assert_eq!(iface.state_of(first), Some(PendingState::Sent));
    }

    #[test]
    fn test_ack_without_pending() {
        let mut iface = Interface::new();
        assert!(matches!(
            iface.mark_acked(1, 1),
            Err(Error::NoPending { socket: 1 })
        ));
    }

    #[test]
    fn test_unmatched_completion_reports_miss() {
        let mut iface = Interface::new();
        let socket = iface.allocate().unwrap();

        // A completion for another socket does not disturb this entry
        assert!(!iface.complete(socket + 1));
        assert!(iface.is_busy(socket));

        assert!(iface.complete(socket));
        assert!(!iface.is_busy(socket));
    }

    #[test]
    fn test_clear_pending() {
        let mut iface = Interface::new();
        iface.allocate().unwrap();
        iface.allocate().unwrap();
        assert_eq!(iface.pending_len(), 2);

        iface.clear_pending();
        assert_eq!(iface.pending_len(), 0);
    }

    #[test]
    fn test_socket_count_clamped() {
        let mut iface = Interface::new();
        iface.set_socket_count(0);
        assert_eq!(iface.socket_count(), 1);
        iface.set_socket_count(200);
        assert_eq!(iface.socket_count(), 15);
        iface.set_socket_count(6);
        assert_eq!(iface.socket_count(), 6);
    }
}
