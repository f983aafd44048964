/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Accepting a pending connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The socket reported a pending error when probed.
    #[error("connection unhealthy: {0}")]
    ProbeFailed(#[source] std::io::Error),

    /// Querying socket metadata failed.
    #[error("socket query failed: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Returns `true` when the peer has gone away (reset, broken pipe, ...),
    /// as opposed to a local failure.
    pub fn is_disconnect(&self) -> bool {
        use std::io::ErrorKind;
        let source = match self {
            Self::SendFailed(e)
            | Self::ReceiveFailed(e)
            | Self::ProbeFailed(e) => e,
            _ => return false,
        };
        matches!(
            source.kind(),
            ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe
                | ErrorKind::NotConnected
                | ErrorKind::UnexpectedEof
        )
    }
}
