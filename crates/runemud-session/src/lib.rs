//! Session tracking for runemud.
//!
//! This crate owns every live client connection:
//!
//! 1. **Accepting** — new sockets get the next [`SessionId`]
//! 2. **Polling** — liveness probes and non-blocking reads, each completed
//!    line becoming an [`Event`](runemud_protocol::Event)
//! 3. **Writing** — per-session output queues flushed without blocking
//! 4. **Cleanup** — any transport failure closes the session and reports
//!    `SessionEnded` exactly once
//!
//! # How it fits in the stack
//!
//! ```text
//! Game loop (above)  ← drains event batches, sends text by session id
//!     ↕
//! Session layer (this crate)  ← ConnectionRegistry
//!     ↕
//! Transport (below)  ← Listener / Connection
//! ```
//!
//! The registry never touches game state.

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::ConnectionRegistry;
pub use runemud_transport::SessionId;
pub use session::{Session, SessionConfig};
