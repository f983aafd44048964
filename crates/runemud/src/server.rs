//! `RunemudServer` builder and entry point.
//!
//! Ties the layers together: a telnet listener feeds a connection
//! registry, which the game loop drives against the world.

use std::future::Future;
use std::net::SocketAddr;

use runemud_session::ConnectionRegistry;
use runemud_tick::TickScheduler;
use runemud_transport::TelnetListener;
use runemud_world::{Catalog, World};

use crate::{GameScheduler, RunemudError, ServerConfig};

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,ignore
/// use runemud::prelude::*;
///
/// let server = RunemudServer::builder()
///     .bind("0.0.0.0:4000")
///     .build()
///     .await?;
/// server.run().await;
/// ```
pub struct RunemudServerBuilder {
    config: ServerConfig,
    catalog: Option<Catalog>,
    seed: Option<u64>,
}

impl RunemudServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            catalog: None,
            seed: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration, bind address included.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses this content instead of loading it from the config.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Seeds the world's dice, for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Loads content and binds the listener.
    ///
    /// Content comes from [`catalog`](Self::catalog) if given, else the
    /// config's content file, else the built-in world.
    pub async fn build(self) -> Result<RunemudServer, RunemudError> {
        let catalog = match (self.catalog, &self.config.content) {
            (Some(catalog), _) => catalog,
            (None, Some(path)) => Catalog::from_path(path)?,
            (None, None) => Catalog::builtin()?,
        };
        tracing::info!(
            floors = catalog.floors.len(),
            monsters = catalog.monsters.len(),
            "content loaded"
        );

        let rules = self.config.rules.clone();
        let world = match self.seed {
            Some(seed) => World::with_seed(catalog, rules, seed),
            None => World::new(catalog, rules),
        };

        let listener = TelnetListener::bind(&self.config.bind_addr).await?;
        let registry =
            ConnectionRegistry::new(listener, self.config.session_config());
        let local_addr = registry.local_addr()?;
        let ticker = TickScheduler::new(self.config.tick_config());

        Ok(RunemudServer {
            scheduler: GameScheduler::new(registry, world, ticker),
            local_addr,
        })
    }
}

impl Default for RunemudServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound server, ready to run.
pub struct RunemudServer {
    scheduler: GameScheduler<TelnetListener>,
    local_addr: SocketAddr,
}

impl RunemudServer {
    /// Creates a new builder.
    pub fn builder() -> RunemudServerBuilder {
        RunemudServerBuilder::new()
    }

    /// The address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the game loop until the process is terminated.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await;
    }

    /// Runs the game loop until `shutdown` completes, then closes every
    /// connection.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) {
        tracing::info!(addr = %self.local_addr, "runemud server running");
        self.scheduler.run_until(shutdown).await;
    }
}
