//! The game loop.
//!
//! One [`GameScheduler`] owns the connection registry, the world, and the
//! tick pacer. Each tick runs to completion before the next sleep:
//!
//! 1. poll the registry (accept, probe, read)
//! 2. swap out the event batch
//! 3. dispatch every event to the world, routing its output after each
//! 4. run world maintenance
//! 5. flush all pending output
//!
//! Nothing here runs concurrently with anything else, so the world needs
//! no locks.

use std::future::Future;
use std::time::Instant;

use runemud_protocol::{Event, Recipient, SessionId};
use runemud_session::{ConnectionRegistry, SessionError};
use runemud_tick::TickScheduler;
use runemud_transport::Listener;
use runemud_world::{Outbound, World, WorldError};

use crate::commands;

/// Drives the registry and the world at a fixed tick rate.
pub struct GameScheduler<L: Listener> {
    registry: ConnectionRegistry<L>,
    world: World,
    ticker: TickScheduler,
}

impl<L: Listener> GameScheduler<L> {
    pub fn new(
        registry: ConnectionRegistry<L>,
        world: World,
        ticker: TickScheduler,
    ) -> Self {
        Self {
            registry,
            world,
            ticker,
        }
    }

    /// Runs ticks until `shutdown` completes, then closes every session.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        tracing::info!(
            interval_ms = self.ticker.interval().as_millis() as u64,
            "game loop running"
        );
        loop {
            tokio::select! {
                info = self.ticker.wait_for_tick() => {
                    tracing::trace!(tick = info.tick, "tick");
                    self.tick(info.now);
                    self.ticker.record_tick_end();
                }
                () = &mut shutdown => break,
            }
        }
        tracing::info!(ticks = self.ticker.tick_count(), "game loop stopped");
        self.registry.shutdown();
    }

    /// One full pass of the loop body at time `now`.
    pub fn tick(&mut self, now: Instant) {
        self.registry.poll(now);
        for event in self.registry.swap_events() {
            let id = event.session_id();
            if let Err(e) = self.dispatch(event, now) {
                self.report(id, &e);
            }
            self.route();
        }
        if let Err(e) = self.world.maintenance(now) {
            tracing::warn!(error = %e, "world maintenance failed");
        }
        self.route();
        self.registry.flush_all();
    }

    fn dispatch(&mut self, event: Event, now: Instant) -> Result<(), WorldError> {
        match event {
            Event::NewSession { id } => {
                self.world.session_opened(id);
                Ok(())
            }
            Event::SessionEnded { id } => {
                self.world.session_closed(id);
                Ok(())
            }
            Event::CommandReceived { id, command } => {
                tracing::debug!(
                    %id,
                    verb = %command.verb,
                    args = %command.args,
                    "command"
                );
                if self.world.is_onboarding(id) {
                    self.world.answer_onboarding(id, &command, now)
                } else {
                    commands::dispatch(
                        &mut self.world,
                        id,
                        &command.verb,
                        &command.args,
                        now,
                    )
                }
            }
        }
    }

    /// Logs a failed event and tells the session what went wrong, when
    /// there is something to tell.
    fn report(&mut self, id: SessionId, error: &WorldError) {
        tracing::warn!(%id, error = %error, "command failed");
        if let Some(text) = error.player_message() {
            self.send(id, &text);
        }
    }

    /// Delivers everything the world produced.
    ///
    /// Broadcasts reach sessions that have a player; sessions still
    /// creating a character only hear what is addressed to them.
    fn route(&mut self) {
        for outbound in self.world.take_outbound() {
            match outbound {
                Outbound::Message {
                    to: Recipient::Session(id),
                    text,
                } => self.send(id, &text),
                Outbound::Message { to, text } => {
                    for id in self.registry.session_ids() {
                        if to.includes(id) && self.world.player(id).is_some() {
                            self.send(id, &text);
                        }
                    }
                }
                Outbound::Disconnect(id) => match self.registry.disconnect(id) {
                    Ok(()) | Err(SessionError::NotFound(_)) => {}
                    Err(e) => tracing::warn!(%id, error = %e, "disconnect failed"),
                },
            }
        }
    }

    /// Sends one line. A session that vanished earlier in the tick is
    /// skipped; its end is already queued.
    fn send(&mut self, id: SessionId, text: &str) {
        if let Err(e) = self.registry.send(id, text) {
            tracing::debug!(%id, error = %e, "dropping output");
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn registry(&self) -> &ConnectionRegistry<L> {
        &self.registry
    }

    pub fn ticker(&self) -> &TickScheduler {
        &self.ticker
    }
}
