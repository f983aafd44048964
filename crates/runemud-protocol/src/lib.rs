//! Wire protocol for runemud.
//!
//! This crate defines how bytes from a telnet client become game input and
//! how game output becomes bytes again:
//!
//! - **Framing** ([`TelnetFramer`]) — strips telnet control sequences and
//!   splits the byte stream into text lines.
//! - **Commands** ([`Command`]) — a line split into a verb and its
//!   arguments.
//! - **Events** ([`Event`], [`EventLog`]) — what happened during one
//!   polling pass, handed to the game loop as an ordered batch.
//! - **Codec** ([`encode_line`]) — outbound text to Latin-1 bytes.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (lines, events) → Session registry → Game loop
//! ```
//!
//! Nothing here knows about the game world.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod command;
mod event;
mod framer;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{LINE_TERMINATOR, encode_line};
pub use command::Command;
pub use event::{Event, EventLog};
pub use framer::{DEFAULT_MAX_LINE_LEN, TelnetFramer};
pub use runemud_transport::SessionId;
pub use types::Recipient;
