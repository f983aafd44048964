//! Monsters spawned from catalog templates.

use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::IndexedRandom;
use runemud_tick::Cooldown;

use crate::catalog::{Catalog, MonsterDef};
use crate::item::Equipment;
use crate::rules::{ability_modifier, proficiency_for_level};
use crate::types::{Abilities, Location};

/// Unique identifier for a live monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonsterId(pub u64);

impl fmt::Display for MonsterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    /// Template description with equipment names filled in.
    pub description: String,
    pub location: Location,
    /// The lair that spawned it, if any.
    pub lair: Option<Location>,
    pub challenge: usize,
    pub abilities: Abilities,
    pub hp: i32,
    pub max_hp: i32,
    pub proficiency: i32,
    pub equipment: Equipment,
    /// Copper carried; goes to whoever kills it.
    pub coins: u64,
    /// Gates this monster's attacks.
    pub attack: Cooldown,
}

impl Monster {
    /// Rolls a fresh monster from its template.
    ///
    /// Weapon and armor are picked at random among catalog entries that
    /// match the template's preference; no preference means an empty slot.
    /// The first attack comes one interval after spawning.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn<R: Rng + ?Sized>(
        id: MonsterId,
        def: &MonsterDef,
        catalog: &Catalog,
        location: Location,
        lair: Option<Location>,
        interval: Duration,
        now: Instant,
        rng: &mut R,
    ) -> Option<Self> {
        let stats = catalog.monster_stats.get(def.challenge)?;

        let weapon = def.weapon.and_then(|pref| {
            let matching: Vec<_> = catalog
                .weapons
                .iter()
                .filter(|w| w.size == pref.size && w.hands == pref.hands)
                .collect();
            matching.choose(&mut *rng).map(|w| w.to_item())
        });
        let armor = def.armor.and_then(|size| {
            let matching: Vec<_> =
                catalog.armors.iter().filter(|a| a.size == size).collect();
            matching.choose(&mut *rng).map(|a| a.to_item())
        });
        let equipment = Equipment { weapon, armor };

        let con = ability_modifier(stats.abilities.constitution);
        let max_hp = (stats.hit_dice.max() + con).max(1);
        let description = def
            .description
            .replace("{weapon}", equipment.weapon_name())
            .replace("{armor}", equipment.armor_name());

        Some(Self {
            id,
            name: def.name.clone(),
            description,
            location,
            lair,
            challenge: def.challenge,
            abilities: stats.abilities,
            hp: max_hp,
            max_hp,
            proficiency: proficiency_for_level(def.challenge as u32),
            coins: stats.wealth.roll(rng).max(0) as u64,
            equipment,
            attack: Cooldown::new(interval, now),
        })
    }

    pub fn armor_class(&self) -> i32 {
        self.equipment.armor_class(self.abilities.dexterity)
    }

    pub fn strength_modifier(&self) -> i32 {
        ability_modifier(self.abilities.strength)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn spawn(name: &str) -> Monster {
        let catalog = Catalog::builtin().unwrap();
        let def = catalog.monster(name).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        Monster::spawn(
            MonsterId(1),
            def,
            &catalog,
            catalog.start,
            None,
            Duration::from_secs(6),
            Instant::now(),
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_spawn_without_preference_is_unarmed() {
        let rat = spawn("giant rat");
        assert!(rat.equipment.weapon.is_none());
        assert!(rat.equipment.armor.is_none());
        assert!(rat.hp >= 1);
    }

    #[test]
    fn test_spawn_picks_matching_equipment() {
        let goblin = spawn("goblin");
        let weapon = goblin.equipment.weapon.as_ref().unwrap();
        assert_eq!(weapon.size(), Some(crate::types::Size::Light));
        assert!(goblin.equipment.armor.is_some());
        assert!(goblin.description.contains(&weapon.name));
        assert!(!goblin.description.contains("{weapon}"));
    }

    #[test]
    fn test_spawn_first_attack_waits_an_interval() {
        let rat = spawn("giant rat");
        let now = rat.attack.last().unwrap();
        assert!(!rat.attack.is_ready(now));
        assert!(rat.attack.is_ready(now + Duration::from_secs(6)));
    }

    #[test]
    fn test_monster_id_display() {
        assert_eq!(MonsterId(12).to_string(), "M-12");
    }
}
