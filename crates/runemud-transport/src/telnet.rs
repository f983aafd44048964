//! Raw TCP transport for telnet clients.
//!
//! The sockets are registered with the tokio reactor but never awaited.
//! Readiness is collected while the game loop sleeps between ticks; every
//! call here either completes at once or reports that it would block.

use std::io;
use std::net::{Shutdown, SocketAddr};

use futures_util::FutureExt;
use tokio::net::{TcpListener, TcpStream};

use crate::{Connection, Listener, RecvOutcome, TransportError};

/// A TCP listener that hands out [`TelnetConnection`]s.
pub struct TelnetListener {
    listener: TcpListener,
}

impl TelnetListener {
    /// Binds a new listener to the given address.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| {
            TransportError::BindFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        tracing::info!(addr, "telnet listener bound");
        Ok(Self { listener })
    }
}

impl Listener for TelnetListener {
    type Connection = TelnetConnection;

    fn try_accept(
        &mut self,
    ) -> Result<Option<(TelnetConnection, SocketAddr)>, TransportError> {
        // A single poll: either a connection is already queued or we move on.
        match self.listener.accept().now_or_never() {
            None => Ok(None),
            Some(Ok((stream, addr))) => {
                if let Err(e) = stream.set_nodelay(true) {
                    tracing::debug!(%addr, error = %e, "failed to set TCP_NODELAY");
                }
                Ok(Some((TelnetConnection { stream }, addr)))
            }
            Some(Err(e)) => Err(TransportError::AcceptFailed(e)),
        }
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }
}

/// A single telnet client socket.
pub struct TelnetConnection {
    stream: TcpStream,
}

impl Connection for TelnetConnection {
    fn try_recv(
        &mut self,
        buf: &mut [u8],
    ) -> Result<RecvOutcome, TransportError> {
        match self.stream.try_read(buf) {
            Ok(0) => Ok(RecvOutcome::Closed),
            Ok(n) => Ok(RecvOutcome::Data(n)),
            Err(e) if is_transient(&e) => Ok(RecvOutcome::Pending),
            Err(e) => Err(TransportError::ReceiveFailed(e)),
        }
    }

    fn try_send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if data.is_empty() {
            return Ok(0);
        }
        match self.stream.try_write(data) {
            Ok(n) => Ok(n),
            Err(e) if is_transient(&e) => Ok(0),
            Err(e) => Err(TransportError::SendFailed(e)),
        }
    }

    fn probe(&mut self) -> Result<(), TransportError> {
        match self.stream.take_error() {
            Ok(None) => Ok(()),
            Ok(Some(e)) | Err(e) => Err(TransportError::ProbeFailed(e)),
        }
    }

    fn close(self) {
        // Deregister from the reactor, then shut down both halves.
        if let Ok(stream) = self.stream.into_std() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
