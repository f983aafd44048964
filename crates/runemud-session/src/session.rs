//! Per-connection state.

use std::net::SocketAddr;
use std::time::Instant;

use runemud_protocol::{TelnetFramer, encode_line};
use runemud_transport::{Connection, SessionId, TransportError};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the connection registry.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bytes read from one session per poll.
    ///
    /// Default: 4096.
    pub read_chunk_size: usize,

    /// Longest input line kept, in characters. Anything longer is truncated.
    ///
    /// Default: 4096.
    pub max_line_len: usize,

    /// Unsent output a session may accumulate before it is treated as dead.
    ///
    /// Default: 256 KiB.
    pub max_pending_output: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 4096,
            max_line_len: runemud_protocol::DEFAULT_MAX_LINE_LEN,
            max_pending_output: 256 * 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One live client connection and its decode state.
///
/// Owned exclusively by the registry; everything above refers to it by id.
pub struct Session<C> {
    id: SessionId,
    conn: C,
    peer_addr: SocketAddr,
    framer: TelnetFramer,
    /// Encoded bytes not yet accepted by the socket.
    outbox: Vec<u8>,
    connected_at: Instant,
    last_liveness_check: Instant,
}

impl<C: Connection> Session<C> {
    pub(crate) fn new(
        id: SessionId,
        conn: C,
        peer_addr: SocketAddr,
        config: &SessionConfig,
        now: Instant,
    ) -> Self {
        Self {
            id,
            conn,
            peer_addr,
            framer: TelnetFramer::with_max_line_len(config.max_line_len),
            outbox: Vec::new(),
            connected_at: now,
            last_liveness_check: now,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    /// When [`ConnectionRegistry::probe_liveness`] last visited this session.
    ///
    /// [`ConnectionRegistry::probe_liveness`]: crate::ConnectionRegistry::probe_liveness
    pub fn last_liveness_check(&self) -> Instant {
        self.last_liveness_check
    }

    /// Bytes queued but not yet written.
    pub fn pending_output(&self) -> usize {
        self.outbox.len()
    }

    pub(crate) fn framer_mut(&mut self) -> &mut TelnetFramer {
        &mut self.framer
    }

    pub(crate) fn conn_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub(crate) fn probe(&mut self, now: Instant) -> Result<(), TransportError> {
        self.last_liveness_check = now;
        self.conn.probe()
    }

    /// Encodes `text` as a line and appends it to the outbox.
    pub(crate) fn queue_line(&mut self, text: &str) {
        self.outbox.extend_from_slice(&encode_line(text));
    }

    /// Writes as much of the outbox as the socket takes right now.
    pub(crate) fn flush(&mut self) -> Result<(), TransportError> {
        let mut written = 0;
        while written < self.outbox.len() {
            let n = self.conn.try_send(&self.outbox[written..])?;
            if n == 0 {
                break;
            }
            written += n;
        }
        self.outbox.drain(..written);
        Ok(())
    }

    pub(crate) fn close(self) {
        self.conn.close();
    }
}

impl<C> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .field("pending_output", &self.outbox.len())
            .finish_non_exhaustive()
    }
}
