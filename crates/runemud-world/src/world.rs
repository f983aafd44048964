//! The game world: every player, monster, and dropped item, plus the
//! output produced while handling input.
//!
//! Command handlers live in sibling modules as further `impl World`
//! blocks; this module holds the state, session lifecycle, and the queries
//! they share.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use runemud_protocol::{Recipient, SessionId};
use runemud_tick::Cooldown;

use crate::WorldError;
use crate::catalog::{Catalog, Room};
use crate::item::Item;
use crate::monster::{Monster, MonsterId};
use crate::player::{Onboarding, Player};
use crate::rules::RulesConfig;
use crate::types::Location;

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Something the world wants done on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// One line of text.
    Message { to: Recipient, text: String },
    /// Close the session after everything queued so far is sent.
    Disconnect(SessionId),
}

/// Output collected during one handler or maintenance call.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    items: Vec<Outbound>,
}

impl Outbox {
    pub(crate) fn tell(&mut self, id: SessionId, text: impl Into<String>) {
        self.items.push(Outbound::Message {
            to: Recipient::Session(id),
            text: text.into(),
        });
    }

    pub(crate) fn tell_each(&mut self, ids: &[SessionId], text: &str) {
        for &id in ids {
            self.tell(id, text);
        }
    }

    pub(crate) fn broadcast(&mut self, to: Recipient, text: impl Into<String>) {
        self.items.push(Outbound::Message {
            to,
            text: text.into(),
        });
    }

    pub(crate) fn disconnect(&mut self, id: SessionId) {
        self.items.push(Outbound::Disconnect(id));
    }

    fn drain(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.items)
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

pub struct World {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) rules: RulesConfig,
    pub(crate) rng: StdRng,
    pub(crate) pending: BTreeMap<SessionId, Onboarding>,
    pub(crate) players: BTreeMap<SessionId, Player>,
    pub(crate) monsters: BTreeMap<MonsterId, Monster>,
    next_monster: u64,
    pub(crate) floor_items: HashMap<Location, Vec<Item>>,
    /// Respawn timer per lair room; rearmed whenever a lair monster dies.
    pub(crate) lairs: BTreeMap<Location, Cooldown>,
    /// Gates how often lairs are checked.
    pub(crate) populate: Cooldown,
    pub(crate) out: Outbox,
}

impl World {
    pub fn new(catalog: Catalog, rules: RulesConfig) -> Self {
        Self::with_rng(catalog, rules, StdRng::from_os_rng())
    }

    /// A world whose dice are reproducible.
    pub fn with_seed(catalog: Catalog, rules: RulesConfig, seed: u64) -> Self {
        Self::with_rng(catalog, rules, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Catalog, rules: RulesConfig, rng: StdRng) -> Self {
        let lairs = catalog
            .rooms()
            .filter(|(_, room)| room.lair.is_some())
            .map(|(loc, _)| (loc, Cooldown::ready(rules.lair_respawn)))
            .collect();
        Self {
            catalog: Arc::new(catalog),
            populate: Cooldown::ready(rules.action_interval),
            rules,
            rng,
            pending: BTreeMap::new(),
            players: BTreeMap::new(),
            monsters: BTreeMap::new(),
            next_monster: 1,
            floor_items: HashMap::new(),
            lairs,
            out: Outbox::default(),
        }
    }

    /// Everything produced since the last call, in order.
    pub fn take_outbound(&mut self) -> Vec<Outbound> {
        self.out.drain()
    }

    // -- Session lifecycle ------------------------------------------------

    /// A new connection: start character creation.
    pub fn session_opened(&mut self, id: SessionId) {
        if self.pending.contains_key(&id) || self.players.contains_key(&id) {
            tracing::warn!(%id, "session opened twice");
            return;
        }
        self.pending.insert(id, Onboarding::AwaitingName);
        self.out.tell(id, "What is your name?");
    }

    /// A connection is gone: drop its record and tell the room.
    pub fn session_closed(&mut self, id: SessionId) {
        if self.pending.remove(&id).is_some() {
            tracing::debug!(%id, "session left during character creation");
            return;
        }
        let Some(player) = self.players.remove(&id) else {
            tracing::warn!(%id, "unknown session closed");
            return;
        };
        tracing::info!(%id, name = %player.name, "player left the game");
        let others = self.ids_at(player.location, None);
        self.out
            .tell_each(&others, &format!("{} quit the game", player.name));
    }

    /// `quit`: say goodbye and ask for the connection to be closed.
    ///
    /// The player stays in the world until the session's end is reported.
    pub fn quit(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let name = self.player_ref(id)?.name.clone();
        self.out.tell(id, format!("Goodbye, {name}."));
        self.out.disconnect(id);
        Ok(())
    }

    // -- Queries ----------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Whether the session is still creating a character.
    pub fn is_onboarding(&self, id: SessionId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn onboarding(&self, id: SessionId) -> Option<&Onboarding> {
        self.pending.get(&id)
    }

    pub fn player(&self, id: SessionId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: SessionId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.get_mut(&id)
    }

    pub fn monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.values()
    }

    pub fn monsters_at(&self, loc: Location) -> impl Iterator<Item = &Monster> {
        self.monsters.values().filter(move |m| m.location == loc)
    }

    pub fn floor_items(&self, loc: Location) -> &[Item] {
        self.floor_items.get(&loc).map_or(&[], Vec::as_slice)
    }

    /// Puts an item on a room's floor, ignoring the floor cap.
    pub fn place_item(&mut self, loc: Location, item: Item) {
        self.floor_items.entry(loc).or_default().push(item);
    }

    /// Sessions of players standing at `loc`, optionally excluding one.
    pub(crate) fn ids_at(
        &self,
        loc: Location,
        except: Option<SessionId>,
    ) -> Vec<SessionId> {
        self.players
            .values()
            .filter(|p| p.location == loc && Some(p.session) != except)
            .map(|p| p.session)
            .collect()
    }

    pub(crate) fn player_ref(&self, id: SessionId) -> Result<&Player, WorldError> {
        self.players.get(&id).ok_or(WorldError::NoPlayer(id))
    }

    pub(crate) fn player_entry(
        &mut self,
        id: SessionId,
    ) -> Result<&mut Player, WorldError> {
        self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))
    }

    /// The room a player stands in.
    pub(crate) fn room_of(&self, id: SessionId) -> Result<(Location, &Room), WorldError> {
        let loc = self.player_ref(id)?.location;
        let room = self.catalog.room_at(loc).ok_or_else(|| {
            WorldError::InvalidContent(format!("{loc} is not a room"))
        })?;
        Ok((loc, room))
    }

    // -- Monsters ---------------------------------------------------------

    /// Spawns a monster from its template and announces it to the room.
    pub fn spawn_monster(
        &mut self,
        name: &str,
        at: Location,
        lair: Option<Location>,
        now: Instant,
    ) -> Option<MonsterId> {
        let catalog = Arc::clone(&self.catalog);
        let def = catalog.monster(name)?;
        let id = MonsterId(self.next_monster);
        let monster = Monster::spawn(
            id,
            def,
            &catalog,
            at,
            lair,
            self.rules.action_interval,
            now,
            &mut self.rng,
        )?;
        self.next_monster += 1;
        tracing::info!(monster = %id, name, location = %at, "monster spawned");
        self.monsters.insert(id, monster);
        let here = self.ids_at(at, None);
        self.out.tell_each(
            &here,
            &format!("A {name} just appeared in a blinding flash of light."),
        );
        Some(id)
    }
}
