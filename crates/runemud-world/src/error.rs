//! Error types for the world layer.

use std::path::PathBuf;

use runemud_protocol::SessionId;

/// Errors raised while loading content or handling a session's input.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The content file could not be read.
    #[error("failed to read content from {path}: {source}")]
    ContentIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid JSON or does not match the catalog shape.
    #[error("malformed content: {0}")]
    ContentParse(#[from] serde_json::Error),

    /// The content parsed but is internally inconsistent.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// No player or provisional record exists for this session.
    #[error("session {0} has no player")]
    NoPlayer(SessionId),

    /// The session answered the name prompt with something unusable.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The session answered a numbered menu with something off the list.
    #[error("invalid choice: {0}")]
    InvalidChoice(String),
}

impl WorldError {
    /// The text to show the session that caused this error, if any.
    ///
    /// Content and bookkeeping errors are for the log only.
    pub fn player_message(&self) -> Option<String> {
        match self {
            Self::InvalidName(reason) => Some(reason.clone()),
            Self::InvalidChoice(_) => {
                Some("Please choose a number from the list.".to_string())
            }
            _ => None,
        }
    }
}
