//! Unified error type for runemud.

use std::path::PathBuf;

use runemud_session::SessionError;
use runemud_transport::TransportError;
use runemud_world::WorldError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RunemudError {
    /// Binding or accepting on the listening socket failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The connection registry failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Content could not be loaded.
    #[error(transparent)]
    World(#[from] WorldError),

    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`ServerConfig`](crate::ServerConfig).
    #[error("malformed config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
