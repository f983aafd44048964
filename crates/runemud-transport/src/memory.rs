//! In-process transport for tests.
//!
//! A [`MemoryListener`] stands in for a bound socket. Tests hold a
//! [`MemoryConnector`] to open connections and drive each one through the
//! returned [`MemoryClient`]: write bytes, read what the server sent, hang
//! up, or inject socket errors.

use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Connection, Listener, RecvOutcome, TransportError};

const LISTEN_PORT: u16 = 4000;
const FIRST_CLIENT_PORT: u16 = 50_000;

#[derive(Default)]
struct Pipe {
    /// Bytes written by the client, not yet read by the server.
    inbound: VecDeque<u8>,
    /// Bytes written by the server, not yet read by the client.
    outbound: Vec<u8>,
    client_closed: bool,
    server_closed: bool,
    recv_error: Option<io::ErrorKind>,
    send_error: Option<io::ErrorKind>,
    socket_error: Option<io::ErrorKind>,
    write_limit: Option<usize>,
}

type SharedPipe = Arc<Mutex<Pipe>>;

fn lock<T>(shared: &Mutex<T>) -> MutexGuard<'_, T> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct Backlog {
    pending: VecDeque<(MemoryConnection, SocketAddr)>,
    next_port: u16,
}

/// An in-memory [`Listener`].
pub struct MemoryListener {
    backlog: Arc<Mutex<Backlog>>,
}

impl MemoryListener {
    /// Creates a listener with an empty backlog.
    pub fn new() -> Self {
        Self {
            backlog: Arc::new(Mutex::new(Backlog {
                pending: VecDeque::new(),
                next_port: FIRST_CLIENT_PORT,
            })),
        }
    }

    /// Returns a handle that can open connections to this listener.
    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector {
            backlog: Arc::clone(&self.backlog),
        }
    }
}

impl Default for MemoryListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for MemoryListener {
    type Connection = MemoryConnection;

    fn try_accept(
        &mut self,
    ) -> Result<Option<(MemoryConnection, SocketAddr)>, TransportError> {
        Ok(lock(&self.backlog).pending.pop_front())
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(SocketAddr::from((Ipv4Addr::LOCALHOST, LISTEN_PORT)))
    }
}

/// Opens connections to a [`MemoryListener`].
#[derive(Clone)]
pub struct MemoryConnector {
    backlog: Arc<Mutex<Backlog>>,
}

impl MemoryConnector {
    /// Queues a new connection on the listener's backlog.
    ///
    /// The server sees it on its next accept pass.
    pub fn connect(&self) -> MemoryClient {
        let pipe = SharedPipe::default();
        let mut backlog = lock(&self.backlog);
        let port = backlog.next_port;
        backlog.next_port = backlog.next_port.wrapping_add(1);
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        backlog.pending.push_back((
            MemoryConnection {
                pipe: Arc::clone(&pipe),
            },
            addr,
        ));
        MemoryClient { pipe, addr }
    }
}

/// The server's end of an in-memory connection.
pub struct MemoryConnection {
    pipe: SharedPipe,
}

impl Connection for MemoryConnection {
    fn try_recv(
        &mut self,
        buf: &mut [u8],
    ) -> Result<RecvOutcome, TransportError> {
        let mut pipe = lock(&self.pipe);
        if let Some(kind) = pipe.recv_error.take() {
            return Err(TransportError::ReceiveFailed(kind.into()));
        }
        if pipe.inbound.is_empty() {
            return Ok(if pipe.client_closed {
                RecvOutcome::Closed
            } else {
                RecvOutcome::Pending
            });
        }
        let n = buf.len().min(pipe.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(pipe.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(RecvOutcome::Data(n))
    }

    fn try_send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let mut pipe = lock(&self.pipe);
        if let Some(kind) = pipe.send_error.take() {
            return Err(TransportError::SendFailed(kind.into()));
        }
        if pipe.client_closed {
            return Err(TransportError::SendFailed(
                io::ErrorKind::BrokenPipe.into(),
            ));
        }
        let n = pipe.write_limit.map_or(data.len(), |l| l.min(data.len()));
        pipe.outbound.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn probe(&mut self) -> Result<(), TransportError> {
        match lock(&self.pipe).socket_error.take() {
            Some(kind) => Err(TransportError::ProbeFailed(kind.into())),
            None => Ok(()),
        }
    }

    fn close(self) {
        lock(&self.pipe).server_closed = true;
    }
}

/// The test's end of an in-memory connection.
#[derive(Clone)]
pub struct MemoryClient {
    pipe: SharedPipe,
    addr: SocketAddr,
}

impl MemoryClient {
    /// The peer address the server sees for this client.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Writes raw bytes toward the server.
    pub fn send(&self, bytes: &[u8]) {
        lock(&self.pipe).inbound.extend(bytes.iter().copied());
    }

    /// Writes a line of text followed by `\r\n`.
    pub fn send_line(&self, line: &str) {
        self.send(line.as_bytes());
        self.send(b"\r\n");
    }

    /// Takes every byte the server has written so far.
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut lock(&self.pipe).outbound)
    }

    /// Takes the server's output decoded as Latin-1.
    pub fn take_text(&self) -> String {
        self.take_output().into_iter().map(char::from).collect()
    }

    /// Closes the client's end; the server reads end-of-stream.
    pub fn hang_up(&self) {
        lock(&self.pipe).client_closed = true;
    }

    /// Makes the server's next read fail with `kind`.
    pub fn fail_next_read(&self, kind: io::ErrorKind) {
        lock(&self.pipe).recv_error = Some(kind);
    }

    /// Makes the server's next write fail with `kind`.
    pub fn fail_next_write(&self, kind: io::ErrorKind) {
        lock(&self.pipe).send_error = Some(kind);
    }

    /// Leaves a pending socket error for the server's next probe.
    pub fn set_socket_error(&self, kind: io::ErrorKind) {
        lock(&self.pipe).socket_error = Some(kind);
    }

    /// Caps how many bytes each server write may deliver.
    pub fn limit_writes(&self, limit: Option<usize>) {
        lock(&self.pipe).write_limit = limit;
    }

    /// Whether the server has closed its end.
    pub fn is_closed_by_server(&self) -> bool {
        lock(&self.pipe).server_closed
    }
}
