//! Error types for the session layer.

use runemud_transport::{SessionId, TransportError};

/// Errors returned by [`ConnectionRegistry`](crate::ConnectionRegistry).
///
/// Socket failures on an individual session are not errors here: they end
/// the session and show up as a `SessionEnded` event instead.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No open session has this id. It never existed or has already ended.
    #[error("no open session {0}")]
    NotFound(SessionId),

    /// The listening socket itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
