//! Players and the provisional records of sessions still creating one.

use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::IndexedRandom;
use runemud_protocol::SessionId;
use runemud_tick::Cooldown;

use crate::catalog::{Catalog, ClassDef};
use crate::dice::Dice;
use crate::item::{Equipment, Item, ItemKind};
use crate::rules::{
    ability_modifier, encumbrance_limit, proficiency_for_level,
};
use crate::types::{Abilities, Ability, Location};

/// Where a session is in character creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Onboarding {
    AwaitingName,
    AwaitingSpecies { name: String },
    AwaitingClass { name: String, species: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Healthy,
    Fatigued,
}

impl Status {
    pub fn name(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Fatigued => "Fatigued",
        }
    }
}

/// A temporary armor class bonus from a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ward {
    pub bonus: i32,
    pub expires: Cooldown,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub session: SessionId,
    pub name: String,
    /// Index into [`Catalog::species`].
    pub species: usize,
    /// Index into [`Catalog::classes`].
    pub class: usize,
    pub location: Location,
    pub level: u32,
    pub xp: u64,
    pub proficiency: i32,
    pub abilities: Abilities,
    /// The count grows by one per level.
    pub hit_dice: Dice,
    pub hp: i32,
    pub max_hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    /// Copper.
    pub coins: u64,
    pub inventory: Vec<Item>,
    pub equipment: Equipment,
    pub status: Status,
    /// Gates movement, attacks, and casting.
    pub fatigue: Cooldown,
    pub regen: Cooldown,
    pub ward: Option<Ward>,
}

impl Player {
    /// Rolls up a level 1 character.
    ///
    /// Scores are the class's base scores plus species bonuses. The
    /// character starts with the first weapon and armor in the catalog
    /// that the class may use.
    #[allow(clippy::too_many_arguments)]
    pub fn create<R: Rng + ?Sized>(
        session: SessionId,
        name: String,
        species: usize,
        class: usize,
        catalog: &Catalog,
        interval: Duration,
        now: Instant,
        rng: &mut R,
    ) -> Self {
        let class_def = &catalog.classes[class];
        let abilities = class_def
            .abilities
            .plus(&catalog.species[species].abilities);
        let hit_dice = class_def.hit_dice;
        let con = ability_modifier(abilities.constitution);
        let max_hp = (hit_dice.max() + con).max(1);
        let max_mana = mana_for_level(class_def, 1);

        let weapon = catalog
            .weapons
            .iter()
            .map(|w| w.to_item())
            .find(|w| class_def.can_equip(w));
        let armor = catalog
            .armors
            .iter()
            .map(|a| a.to_item())
            .find(|a| class_def.can_equip(a));

        Self {
            session,
            name,
            species,
            class,
            location: catalog.start,
            level: 1,
            xp: 0,
            proficiency: proficiency_for_level(1),
            abilities,
            hit_dice,
            hp: max_hp,
            max_hp,
            mana: max_mana,
            max_mana,
            coins: class_def.wealth.roll(rng).max(0) as u64,
            inventory: Vec::new(),
            equipment: Equipment { weapon, armor },
            status: Status::Healthy,
            fatigue: Cooldown::ready(interval),
            regen: Cooldown::new(interval, now),
            ward: None,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.abilities.get(ability))
    }

    pub fn armor_class(&self) -> i32 {
        self.equipment.armor_class(self.abilities.dexterity)
            + self.ward.map_or(0, |w| w.bonus)
    }

    pub fn is_fatigued(&self, now: Instant) -> bool {
        !self.fatigue.is_ready(now)
    }

    /// Starts the fatigue interval after an attack or cast.
    pub fn tire(&mut self, now: Instant) {
        self.fatigue.reset(now);
        self.status = Status::Fatigued;
    }

    pub fn carried_weight(&self) -> u32 {
        self.inventory.iter().map(|i| i.weight).sum::<u32>()
            + self.equipment.weight()
    }

    pub fn carry_limit(&self) -> u32 {
        encumbrance_limit(self.abilities.strength)
    }

    pub fn can_carry(&self, item: &Item) -> bool {
        self.carried_weight() + item.weight <= self.carry_limit()
    }

    pub fn carries_light(&self) -> bool {
        self.inventory.iter().any(Item::gives_light)
    }

    /// Index of the first inventory item whose name matches `query`.
    pub fn find_item(&self, query: &str) -> Option<usize> {
        self.inventory
            .iter()
            .position(|i| crate::rules::name_matches(&i.name, query))
    }

    pub fn has_key(&self, door: usize) -> Option<&Item> {
        self.inventory
            .iter()
            .find(|i| i.kind == ItemKind::Key { door })
    }

    /// Spells written in the first spellbook carried.
    pub fn spellbook(&self) -> Option<&Vec<String>> {
        self.inventory.iter().find_map(|i| match &i.kind {
            ItemKind::Spellbook { spells } => Some(spells),
            _ => None,
        })
    }

    pub fn spellbook_mut(&mut self) -> Option<&mut Vec<String>> {
        self.inventory.iter_mut().find_map(|i| match &mut i.kind {
            ItemKind::Spellbook { spells } => Some(spells),
            _ => None,
        })
    }

    /// Advances one level: proficiency, an extra hit die, more maximum
    /// hit points, and on the class's increase levels +1 to two random
    /// abilities below 20.
    ///
    /// Returns the abilities that increased.
    pub fn level_up<R: Rng + ?Sized>(
        &mut self,
        class: &ClassDef,
        rng: &mut R,
    ) -> Vec<Ability> {
        self.level += 1;
        self.proficiency = proficiency_for_level(self.level);

        let mut improved = Vec::new();
        if class.asi.contains(&self.level) {
            let eligible: Vec<Ability> = Ability::ALL
                .into_iter()
                .filter(|&a| self.abilities.get(a) < 20)
                .collect();
            for &ability in eligible.choose_multiple(rng, 2) {
                *self.abilities.get_mut(ability) += 1;
                improved.push(ability);
            }
        }

        self.hit_dice.count += 1;
        let gain = Dice::new(1, self.hit_dice.sides).roll(rng)
            + self.modifier(Ability::Constitution);
        self.max_hp += gain.max(1);
        self.max_mana = mana_for_level(class, self.level);
        improved
    }

    /// Restores hit points, capped at the maximum. Returns the amount
    /// actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }
}

/// Mana pool: two points per level for spellcasting classes.
pub fn mana_for_level(class: &ClassDef, level: u32) -> i32 {
    if class.magic { level as i32 * 2 } else { 0 }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn fighter(catalog: &Catalog) -> Player {
        let mut rng = StdRng::seed_from_u64(11);
        Player::create(
            SessionId::new(1),
            "Aria".into(),
            0,
            0,
            catalog,
            Duration::from_secs(6),
            Instant::now(),
            &mut rng,
        )
    }

    #[test]
    fn test_create_sums_class_and_species_scores() {
        let catalog = Catalog::builtin().unwrap();
        let player = fighter(&catalog);
        let class = &catalog.classes[0];
        let species = &catalog.species[0];
        assert_eq!(
            player.abilities.strength,
            class.abilities.strength + species.abilities.strength
        );
        assert_eq!(player.level, 1);
        assert_eq!(player.proficiency, 2);
        assert_eq!(player.location, catalog.start);
    }

    #[test]
    fn test_create_max_hp_is_full_hit_die_plus_con() {
        let catalog = Catalog::builtin().unwrap();
        let player = fighter(&catalog);
        let con = ability_modifier(player.abilities.constitution);
        assert_eq!(player.max_hp, catalog.classes[0].hit_dice.max() + con);
        assert_eq!(player.hp, player.max_hp);
    }

    #[test]
    fn test_create_equips_usable_gear() {
        let catalog = Catalog::builtin().unwrap();
        let player = fighter(&catalog);
        assert_eq!(player.equipment.weapon_name(), catalog.weapons[0].name);
        assert_eq!(player.equipment.armor_name(), catalog.armors[0].name);
    }

    #[test]
    fn test_create_is_not_fatigued() {
        let catalog = Catalog::builtin().unwrap();
        let player = fighter(&catalog);
        assert!(!player.is_fatigued(Instant::now()));
        assert_eq!(player.status, Status::Healthy);
    }

    #[test]
    fn test_level_up_adds_hit_die_and_hp() {
        let catalog = Catalog::builtin().unwrap();
        let mut player = fighter(&catalog);
        let mut rng = StdRng::seed_from_u64(3);
        let before = player.max_hp;
        player.level_up(&catalog.classes[0], &mut rng);
        assert_eq!(player.level, 2);
        assert_eq!(player.hit_dice.count, 2);
        assert!(player.max_hp > before);
    }

    #[test]
    fn test_level_up_on_asi_level_raises_two_abilities() {
        let catalog = Catalog::builtin().unwrap();
        let mut player = fighter(&catalog);
        player.level = 3;
        let mut rng = StdRng::seed_from_u64(5);
        let before = player.abilities;
        let improved = player.level_up(&catalog.classes[0], &mut rng);
        assert_eq!(improved.len(), 2);
        let total = |a: &Abilities| Ability::ALL.iter().map(|&x| a.get(x)).sum::<i32>();
        assert_eq!(total(&player.abilities), total(&before) + 2);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let catalog = Catalog::builtin().unwrap();
        let mut player = fighter(&catalog);
        player.hp = player.max_hp - 2;
        assert_eq!(player.heal(10), 2);
        assert_eq!(player.hp, player.max_hp);
    }

    #[test]
    fn test_can_carry_respects_strength_limit() {
        let catalog = Catalog::builtin().unwrap();
        let player = fighter(&catalog);
        let anvil = Item {
            name: "anvil".into(),
            weight: 10_000,
            value: 1,
            kind: ItemKind::Gear { light: false },
        };
        assert!(!player.can_carry(&anvil));
    }
}
