//! Transport abstraction layer for runemud.
//!
//! Provides the [`Listener`] and [`Connection`] traits that abstract over
//! byte-stream sockets. Every operation is non-blocking: a call either
//! completes immediately or reports that nothing is ready yet. The game loop
//! polls these once per tick instead of awaiting them.
//!
//! # Feature Flags
//!
//! - `telnet` (default) — raw TCP transport driven through the tokio reactor
//! - `memory` — in-process transport with scriptable clients, for tests

mod error;
#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "telnet")]
mod telnet;

pub use error::TransportError;
#[cfg(feature = "memory")]
pub use memory::{MemoryClient, MemoryConnection, MemoryConnector, MemoryListener};
#[cfg(feature = "telnet")]
pub use telnet::{TelnetConnection, TelnetListener};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connected session.
///
/// Identifiers are assigned by the connection registry and are never reused
/// while the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new `SessionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Result of a single non-blocking read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvOutcome {
    /// `n` bytes were copied into the caller's buffer.
    Data(usize),
    /// No bytes are available right now.
    Pending,
    /// The peer closed its end of the stream.
    Closed,
}

/// Accepts new incoming connections without blocking.
pub trait Listener: 'static {
    /// The connection type produced by this listener.
    type Connection: Connection;

    /// Accepts one pending connection, if there is one.
    ///
    /// Returns `Ok(None)` when no connection is waiting.
    fn try_accept(
        &mut self,
    ) -> Result<Option<(Self::Connection, SocketAddr)>, TransportError>;

    /// The address this listener is bound to.
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}

/// A single bidirectional byte stream.
pub trait Connection: 'static {
    /// Reads whatever bytes are available into `buf`.
    fn try_recv(
        &mut self,
        buf: &mut [u8],
    ) -> Result<RecvOutcome, TransportError>;

    /// Writes as many bytes of `data` as the socket accepts right now.
    ///
    /// Returns the number of bytes written, which may be zero.
    fn try_send(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Checks whether the underlying socket has reported an error.
    fn probe(&mut self) -> Result<(), TransportError>;

    /// Closes the connection. Errors during close are ignored.
    fn close(self)
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_new_and_into_inner() {
        let id = SessionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new(7);
        assert_eq!(id.to_string(), "S-7");
    }

    #[test]
    fn test_session_id_ordering_follows_raw_value() {
        assert!(SessionId::new(1) < SessionId::new(2));
        assert_eq!(SessionId::new(3), SessionId::new(3));
    }

    #[test]
    fn test_session_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(SessionId::new(1), "aria");
        map.insert(SessionId::new(2), "bram");
        assert_eq!(map[&SessionId::new(1)], "aria");
    }
}
