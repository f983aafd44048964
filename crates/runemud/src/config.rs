//! Server configuration, loadable from JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use runemud_session::SessionConfig;
use runemud_tick::TickConfig;
use runemud_world::RulesConfig;
use runemud_world::rules::millis;
use serde::{Deserialize, Serialize};

use crate::RunemudError;

/// Everything needed to start a server.
///
/// Every field has a default, so a config file only lists what it
/// changes:
///
/// ```json
/// { "bind_addr": "127.0.0.1:4000", "rules": { "action_interval": 3000 } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on. Default: `0.0.0.0:4000`.
    pub bind_addr: String,

    /// Time between game loop ticks, in milliseconds. Default: 200.
    #[serde(with = "millis")]
    pub tick_interval: Duration,

    /// Bytes read from one session per tick. Default: 4096.
    pub read_chunk_size: usize,

    /// Longest input line kept. Default: 4096.
    pub max_line_len: usize,

    /// Unsent output allowed per session before it is dropped.
    /// Default: 256 KiB.
    pub max_pending_output: usize,

    /// Game timing and capacity.
    pub rules: RulesConfig,

    /// World content file. The built-in world is used when unset.
    pub content: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            tick_interval: TickConfig::default().interval,
            read_chunk_size: session.read_chunk_size,
            max_line_len: session.max_line_len,
            max_pending_output: session.max_pending_output,
            rules: RulesConfig::default(),
            content: None,
        }
    }
}

impl ServerConfig {
    /// Reads a config file.
    ///
    /// # Errors
    /// [`RunemudError::ConfigIo`] if the file can't be read,
    /// [`RunemudError::ConfigParse`] if it isn't a valid config.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RunemudError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| {
            RunemudError::ConfigIo {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, RunemudError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            read_chunk_size: self.read_chunk_size,
            max_line_len: self.max_line_len,
            max_pending_output: self.max_pending_output,
        }
    }

    pub fn tick_config(&self) -> TickConfig {
        TickConfig::with_interval(self.tick_interval)
    }
}
