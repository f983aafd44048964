//! The connection registry: every live session, keyed by id.
//!
//! The game loop calls [`ConnectionRegistry::poll`] once per tick, then
//! takes the accumulated events with [`ConnectionRegistry::swap_events`].
//! Nothing in here blocks: accepts, reads and writes either complete at
//! once or are retried on a later tick.
//!
//! # Disconnect handling
//!
//! A session ends when its client closes the stream, when any read, write
//! or probe fails, when its output backlog grows past
//! [`SessionConfig::max_pending_output`], or when the game asks for it via
//! [`ConnectionRegistry::disconnect`]. In every case the socket is closed,
//! the session is removed, and one `SessionEnded` is appended to the
//! current batch. Nothing is ever raised to the caller for a single
//! session's failure.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Instant;

use runemud_protocol::{Command, Event, EventLog};
use runemud_transport::{
    Connection, Listener, RecvOutcome, SessionId, TransportError,
};

use crate::{Session, SessionConfig, SessionError};

/// Why a session is being torn down. Only used for logging.
#[derive(Debug)]
enum EndReason {
    ClosedByPeer,
    Requested,
    Backlog(usize),
    Failed(TransportError),
}

impl EndReason {
    /// Whether the other end went away, rather than something failing here.
    fn is_peer_loss(&self) -> bool {
        match self {
            Self::ClosedByPeer => true,
            Self::Failed(e) => e.is_disconnect(),
            Self::Requested | Self::Backlog(_) => false,
        }
    }
}

/// Owns the listener and all open sessions.
///
/// Sessions are stored in a `BTreeMap`, so iteration is in id order, which
/// is also accept order.
pub struct ConnectionRegistry<L: Listener> {
    listener: L,
    sessions: BTreeMap<SessionId, Session<L::Connection>>,
    events: EventLog,
    config: SessionConfig,
    next_id: u64,
    read_buf: Vec<u8>,
}

impl<L: Listener> ConnectionRegistry<L> {
    /// Creates an empty registry around a bound listener.
    pub fn new(listener: L, config: SessionConfig) -> Self {
        let read_buf = vec![0; config.read_chunk_size.max(1)];
        Self {
            listener,
            sessions: BTreeMap::new(),
            events: EventLog::new(),
            config,
            next_id: 1,
            read_buf,
        }
    }

    // -----------------------------------------------------------------------
    // Polling
    // -----------------------------------------------------------------------

    /// Runs one full polling pass: accept, probe, then read.
    pub fn poll(&mut self, now: Instant) {
        self.accept_new(now);
        self.probe_liveness(now);
        self.poll_readable();
    }

    /// Accepts every pending connection. Each gets the next session id and
    /// a `NewSession` event.
    ///
    /// Returns how many sessions were opened.
    pub fn accept_new(&mut self, now: Instant) -> usize {
        let mut accepted = 0;
        loop {
            match self.listener.try_accept() {
                Ok(Some((conn, peer_addr))) => {
                    let id = SessionId::new(self.next_id);
                    self.next_id += 1;
                    let session =
                        Session::new(id, conn, peer_addr, &self.config, now);
                    self.sessions.insert(id, session);
                    self.events.push(Event::NewSession { id });
                    tracing::info!(%id, %peer_addr, "session opened");
                    accepted += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    // Usually a connection that died in the backlog; the
                    // listener itself keeps working.
                    tracing::debug!(error = %e, "accept failed");
                    break;
                }
            }
        }
        accepted
    }

    /// Probes every open session and flushes its queued output.
    ///
    /// Updates each session's last liveness check. A probe or write failure
    /// ends the session.
    pub fn probe_liveness(&mut self, now: Instant) {
        for id in self.session_ids() {
            let Some(session) = self.sessions.get_mut(&id) else {
                continue;
            };
            let outcome = session.probe(now).and_then(|()| session.flush());
            if let Err(e) = outcome {
                self.end_session(id, EndReason::Failed(e));
            }
        }
    }

    /// Reads one chunk from every session that has data and turns each
    /// completed line into a `CommandReceived` event.
    pub fn poll_readable(&mut self) {
        for id in self.session_ids() {
            let Some(session) = self.sessions.get_mut(&id) else {
                continue;
            };
            match session.conn_mut().try_recv(&mut self.read_buf) {
                Ok(RecvOutcome::Pending) => {}
                Ok(RecvOutcome::Data(n)) => {
                    let lines = session.framer_mut().feed(&self.read_buf[..n]);
                    for line in lines {
                        let command = Command::parse(&line);
                        tracing::trace!(%id, verb = %command.verb, "command received");
                        self.events.push(Event::CommandReceived { id, command });
                    }
                }
                Ok(RecvOutcome::Closed) => {
                    self.end_session(id, EndReason::ClosedByPeer);
                }
                Err(e) => self.end_session(id, EndReason::Failed(e)),
            }
        }
    }

    /// Hands over everything that happened since the previous swap.
    pub fn swap_events(&mut self) -> Vec<Event> {
        self.events.swap()
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// Queues one line of text for a session and tries to write it.
    ///
    /// A write failure ends the session (its `SessionEnded` arrives with the
    /// next batch) and is not reported here.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no such session is open.
    pub fn send(&mut self, id: SessionId, text: &str) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        session.queue_line(text);
        let pending = session.pending_output();
        if pending > self.config.max_pending_output {
            self.end_session(id, EndReason::Backlog(pending));
            return Ok(());
        }
        if let Err(e) = session.flush() {
            self.end_session(id, EndReason::Failed(e));
        }
        Ok(())
    }

    /// Writes whatever is queued for every session.
    pub fn flush_all(&mut self) {
        for id in self.session_ids() {
            let Some(session) = self.sessions.get_mut(&id) else {
                continue;
            };
            if session.pending_output() == 0 {
                continue;
            }
            if let Err(e) = session.flush() {
                self.end_session(id, EndReason::Failed(e));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Closes a session on request, after a last attempt to deliver its
    /// queued output.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no such session is open.
    pub fn disconnect(&mut self, id: SessionId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        let _ = session.flush();
        self.end_session(id, EndReason::Requested);
        Ok(())
    }

    /// Closes every session and stops tracking them. No events are raised.
    pub fn shutdown(&mut self) {
        let sessions = std::mem::take(&mut self.sessions);
        let count = sessions.len();
        for (_, mut session) in sessions {
            let _ = session.flush();
            session.close();
        }
        tracing::info!(sessions = count, "connection registry shut down");
    }

    fn end_session(&mut self, id: SessionId, reason: EndReason) {
        let Some(session) = self.sessions.remove(&id) else {
            return;
        };
        match &reason {
            EndReason::Failed(e) if reason.is_peer_loss() => {
                tracing::debug!(%id, error = %e, "peer dropped the connection");
            }
            EndReason::Failed(e) => {
                tracing::warn!(%id, error = %e, "session failed");
            }
            EndReason::Backlog(bytes) => {
                tracing::warn!(%id, bytes, "output backlog exceeded");
            }
            EndReason::ClosedByPeer | EndReason::Requested => {}
        }
        tracing::info!(
            %id,
            peer_addr = %session.peer_addr(),
            ?reason,
            "session ended"
        );
        session.close();
        self.events.push(Event::SessionEnded { id });
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Ids of all open sessions, in accept order.
    ///
    /// A snapshot: safe to iterate while sessions are being removed.
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session<L::Connection>> {
        self.sessions.get(&id)
    }

    pub fn peer_addr(&self, id: SessionId) -> Option<SocketAddr> {
        self.sessions.get(&id).map(Session::peer_addr)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Events waiting for the next swap.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, SessionError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_is_peer_loss_reset_is_peer() {
        let reset = TransportError::ReceiveFailed(io::Error::from(
            io::ErrorKind::ConnectionReset,
        ));
        assert!(EndReason::Failed(reset).is_peer_loss());
        assert!(EndReason::ClosedByPeer.is_peer_loss());
    }

    #[test]
    fn test_is_peer_loss_local_failure_is_not_peer() {
        let denied = TransportError::SendFailed(io::Error::from(
            io::ErrorKind::PermissionDenied,
        ));
        assert!(!EndReason::Failed(denied).is_peer_loss());
        assert!(!EndReason::Backlog(1 << 20).is_peer_loss());
        assert!(!EndReason::Requested.is_peer_loss());
    }
}
