//! The runemud game world.
//!
//! [`World`] owns every player, monster, and dropped item. The game loop
//! feeds it session lifecycle events and parsed commands, calls
//! [`World::maintenance`] once per tick, and collects the resulting
//! [`Outbound`] messages with [`World::take_outbound`].
//!
//! Content (species, classes, equipment, spells, monsters, and the map)
//! comes from a JSON [`Catalog`]; [`Catalog::builtin`] loads the world
//! that ships with the crate.
//!
//! Nothing here touches sockets or clocks: time arrives as an explicit
//! `now`, and every timer is a [`runemud_tick::Cooldown`].

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod actions;
pub mod catalog;
mod combat;
pub mod dice;
mod error;
pub mod item;
mod look;
mod maintenance;
pub mod monster;
mod onboarding;
pub mod player;
pub mod rules;
mod shop;
pub mod types;
mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use catalog::Catalog;
pub use error::WorldError;
pub use item::{Equipment, Item, ItemKind};
pub use monster::{Monster, MonsterId};
pub use player::{Onboarding, Player, Status};
pub use rules::RulesConfig;
pub use types::{Direction, Location};
pub use world::{Outbound, World};

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Instant;

    use runemud_protocol::{Command, Recipient, SessionId};

    use crate::{Outbound, World};

    /// Runs a session through character creation as the first species
    /// and class, then discards the output.
    pub(crate) fn join(
        world: &mut World,
        n: u64,
        name: &str,
        now: Instant,
    ) -> SessionId {
        let id = SessionId::new(n);
        world.session_opened(id);
        for answer in [name, "0", "0"] {
            world
                .answer_onboarding(id, &Command::parse(answer), now)
                .unwrap();
        }
        world.take_outbound();
        id
    }

    /// Drains the world's output and keeps the lines addressed to `id`.
    pub(crate) fn lines(world: &mut World, id: SessionId) -> Vec<String> {
        world
            .take_outbound()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Message {
                    to: Recipient::Session(to),
                    text,
                } if to == id => Some(text),
                _ => None,
            })
            .collect()
    }
}
