//! # Runemud
//!
//! A multi-user dungeon served over telnet.
//!
//! The server is one single-threaded game loop. Each tick it polls every
//! connection without blocking, hands the resulting events to the
//! [`World`](runemud_world::World) in order, runs timed world upkeep, and
//! writes the output. The sleep between ticks is the only place it
//! yields.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use runemud::prelude::*;
//!
//! # async fn start() -> Result<(), RunemudError> {
//! let server = RunemudServer::builder()
//!     .bind("0.0.0.0:4000")
//!     .build()
//!     .await?;
//! server.run().await;
//! # Ok(())
//! # }
//! ```

pub mod commands;
mod config;
mod error;
mod scheduler;
mod server;

pub use config::ServerConfig;
pub use error::RunemudError;
pub use scheduler::GameScheduler;
pub use server::{RunemudServer, RunemudServerBuilder};

/// Re-exports for building and running a server.
pub mod prelude {
    pub use crate::{GameScheduler, RunemudError, RunemudServer, ServerConfig};
    pub use runemud_protocol::{Command, Event, Recipient, SessionId};
    pub use runemud_session::{ConnectionRegistry, SessionConfig};
    pub use runemud_tick::{TickConfig, TickScheduler};
    pub use runemud_world::{Catalog, RulesConfig, World};
}
