//! Periodic upkeep run once per tick after all input is handled.

use std::sync::Arc;
use std::time::Instant;

use rand::seq::IndexedRandom;

use crate::WorldError;
use crate::dice::Dice;
use crate::player::Status;
use crate::types::Location;
use crate::world::World;

/// Hit points regained per regeneration interval.
const REGEN: Dice = Dice::new(1, 4);

impl World {
    /// Populates lairs, lets monsters attack, and refreshes players.
    ///
    /// Every step is gated by its own cooldowns, so calling this more
    /// often than the action interval is harmless.
    pub fn maintenance(&mut self, now: Instant) -> Result<(), WorldError> {
        self.populate_lairs(now);
        self.monster_aggression(now)?;
        self.player_upkeep(now);
        Ok(())
    }

    /// Refills empty lairs whose respawn delay has passed.
    fn populate_lairs(&mut self, now: Instant) {
        if !self.populate.try_fire(now) {
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let due: Vec<Location> = self
            .lairs
            .iter()
            .filter(|(_, timer)| timer.is_ready(now))
            .map(|(&loc, _)| loc)
            .collect();
        for loc in due {
            if self.monsters_at(loc).next().is_some() {
                continue;
            }
            let Some(lair) = catalog.room_at(loc).and_then(|r| r.lair.as_ref())
            else {
                continue;
            };
            tracing::debug!(location = %loc, count = lair.count, "populating lair");
            for _ in 0..lair.count {
                if let Some(name) = lair.monsters.choose(&mut self.rng) {
                    self.spawn_monster(name, loc, Some(loc), now);
                }
            }
        }
    }

    /// Clears fatigue and expired wards, and regenerates hit points and
    /// mana once per interval.
    fn player_upkeep(&mut self, now: Instant) {
        for player in self.players.values_mut() {
            let id = player.session;
            if player.status == Status::Fatigued && !player.is_fatigued(now) {
                player.status = Status::Healthy;
            }
            if player.ward.is_some_and(|w| w.expires.is_ready(now)) {
                player.ward = None;
                self.out.tell(id, "Your magical protection fades.");
            }
            if player.regen.try_fire(now) {
                if player.hp < player.max_hp {
                    let amount = REGEN.roll(&mut self.rng);
                    player.heal(amount);
                }
                player.mana = (player.mana + 1).min(player.max_mana);
            }
        }
    }
}
