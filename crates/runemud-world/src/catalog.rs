//! Static game content: species, classes, equipment, spells, monsters, and
//! the map.
//!
//! A catalog is loaded once from JSON, validated, and then shared
//! read-only by the [`World`](crate::World).

use std::path::Path;

use serde::Deserialize;

use crate::WorldError;
use crate::dice::Dice;
use crate::item::{Item, ItemKind};
use crate::types::{Abilities, Direction, Hands, Location, Size};

/// The content that ships with the crate.
const DEFAULT_CONTENT: &str = include_str!("../content/default.json");

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesDef {
    pub name: String,
    /// Added to the class's base scores.
    #[serde(default)]
    pub abilities: Abilities,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub abilities: Abilities,
    pub hit_dice: Dice,
    /// Starting coins, in copper.
    pub wealth: Dice,
    #[serde(default)]
    pub armor: Vec<Size>,
    #[serde(default)]
    pub weapons: Vec<Size>,
    #[serde(default)]
    pub magic: bool,
    /// Levels that grant an ability score increase.
    #[serde(default)]
    pub asi: Vec<u32>,
}

impl ClassDef {
    /// Whether members of this class may wield or wear `item`.
    pub fn can_equip(&self, item: &Item) -> bool {
        match &item.kind {
            ItemKind::Weapon { size, .. } => self.weapons.contains(size),
            ItemKind::Armor { size, .. } => self.armor.contains(size),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeaponDef {
    pub name: String,
    pub damage: Dice,
    pub size: Size,
    pub hands: Hands,
    pub weight: u32,
    pub value: u64,
}

impl WeaponDef {
    pub fn to_item(&self) -> Item {
        Item {
            name: self.name.clone(),
            weight: self.weight,
            value: self.value,
            kind: ItemKind::Weapon {
                damage: self.damage,
                size: self.size,
                hands: self.hands,
                enchantment: 0,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArmorDef {
    pub name: String,
    #[serde(rename = "ac")]
    pub base_ac: i32,
    pub size: Size,
    pub weight: u32,
    pub value: u64,
}

impl ArmorDef {
    pub fn to_item(&self) -> Item {
        Item {
            name: self.name.clone(),
            weight: self.weight,
            value: self.value,
            kind: ItemKind::Armor {
                base_ac: self.base_ac,
                size: self.size,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearKind {
    #[default]
    Plain,
    Light,
    Spellbook,
    Service,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GearDef {
    pub name: String,
    #[serde(default)]
    pub weight: u32,
    pub value: u64,
    #[serde(default)]
    pub kind: GearKind,
}

impl GearDef {
    pub fn to_item(&self) -> Item {
        let kind = match self.kind {
            GearKind::Plain => ItemKind::Gear { light: false },
            GearKind::Light => ItemKind::Gear { light: true },
            GearKind::Spellbook => ItemKind::Spellbook { spells: Vec::new() },
            GearKind::Service => ItemKind::Service,
        };
        Item {
            name: self.name.clone(),
            weight: self.weight,
            value: self.value,
            kind,
        }
    }
}

/// A key; its index in [`Catalog::keys`] is the door it opens.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyDef {
    pub name: String,
    #[serde(default)]
    pub weight: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoorDef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellKind {
    Damage,
    Heal,
    Buff,
    Enchant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpellDef {
    pub name: String,
    pub kind: SpellKind,
    pub effect: Dice,
    /// Spell level; also its mana cost. Level 0 spells are free.
    pub level: u32,
    /// Price to learn, in copper.
    pub value: u64,
    /// Class names allowed to learn it.
    pub classes: Vec<String>,
    /// Shown when cast; `{target}` and `{amount}` are substituted.
    pub description: String,
}

impl SpellDef {
    pub fn describe(&self, target: &str, amount: i32) -> String {
        self.description
            .replace("{target}", target)
            .replace("{amount}", &amount.to_string())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WeaponPreference {
    pub size: Size,
    pub hands: Hands,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonsterDef {
    pub name: String,
    /// Long description; `{weapon}` and `{armor}` are substituted.
    pub description: String,
    pub challenge: usize,
    #[serde(default)]
    pub weapon: Option<WeaponPreference>,
    #[serde(default)]
    pub armor: Option<Size>,
}

/// Statistics shared by every monster of one challenge rating.
#[derive(Debug, Clone, Deserialize)]
pub struct MonsterStats {
    pub hit_dice: Dice,
    pub abilities: Abilities,
    pub wealth: Dice,
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopKind {
    Armor,
    Weapons,
    Gear,
    Spells,
    Training,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lair {
    /// Monster names to pick from when populating.
    pub monsters: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Trap {
    pub name: String,
    /// Dexterity save difficulty.
    pub dc: i32,
    pub damage: Dice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Room {
    pub short: String,
    pub long: String,
    #[serde(default)]
    pub dark: bool,
    #[serde(default)]
    pub shop: Option<ShopKind>,
    #[serde(default)]
    pub lair: Option<Lair>,
    /// Door id; entering needs the key with the same id.
    #[serde(default)]
    pub door: Option<usize>,
    #[serde(default)]
    pub trap: Option<Trap>,
    /// Key ids handed to whoever kills a monster here.
    #[serde(default)]
    pub loot: Vec<usize>,
}

/// One level of the map. `grid[row][col]` is 0 for solid rock or the
/// 1-based index of a room in `rooms`.
#[derive(Debug, Clone, Deserialize)]
pub struct Floor {
    pub name: String,
    pub rooms: Vec<Room>,
    pub grid: Vec<Vec<usize>>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub species: Vec<SpeciesDef>,
    pub classes: Vec<ClassDef>,
    pub weapons: Vec<WeaponDef>,
    pub armors: Vec<ArmorDef>,
    #[serde(default)]
    pub gear: Vec<GearDef>,
    #[serde(default)]
    pub keys: Vec<KeyDef>,
    #[serde(default)]
    pub doors: Vec<DoorDef>,
    #[serde(default)]
    pub spells: Vec<SpellDef>,
    #[serde(default)]
    pub monsters: Vec<MonsterDef>,
    /// Indexed by challenge rating.
    #[serde(default)]
    pub monster_stats: Vec<MonsterStats>,
    pub floors: Vec<Floor>,
    /// Where new and unconscious players wake up.
    pub start: Location,
    /// Where the gong summons monsters. No gong when absent.
    #[serde(default)]
    pub arena: Option<Location>,
}

impl Catalog {
    /// The built-in world.
    pub fn builtin() -> Result<Self, WorldError> {
        Self::from_json(DEFAULT_CONTENT)
    }

    /// Parses and validates a catalog.
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| {
            WorldError::ContentIo {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json(&json)
    }

    /// Checks every cross-reference so lookups during play can't miss.
    pub fn validate(&self) -> Result<(), WorldError> {
        let invalid = |msg: String| Err(WorldError::InvalidContent(msg));

        for (what, empty) in [
            ("species", self.species.is_empty()),
            ("classes", self.classes.is_empty()),
            ("weapons", self.weapons.is_empty()),
            ("armors", self.armors.is_empty()),
            ("floors", self.floors.is_empty()),
        ] {
            if empty {
                return invalid(format!("no {what} defined"));
            }
        }

        for floor in &self.floors {
            for (r, row) in floor.grid.iter().enumerate() {
                for (c, &cell) in row.iter().enumerate() {
                    if cell > floor.rooms.len() {
                        return invalid(format!(
                            "floor '{}' cell ({r}, {c}) names room {cell} \
                             but only {} exist",
                            floor.name,
                            floor.rooms.len()
                        ));
                    }
                }
            }
            for room in &floor.rooms {
                if let Some(door) = room.door {
                    if door >= self.doors.len() {
                        return invalid(format!(
                            "room '{}' has unknown door {door}",
                            room.short
                        ));
                    }
                }
                if let Some(key) =
                    room.loot.iter().find(|&&k| k >= self.keys.len())
                {
                    return invalid(format!(
                        "room '{}' loots unknown key {key}",
                        room.short
                    ));
                }
                if let Some(lair) = &room.lair {
                    if lair.monsters.is_empty() || lair.count == 0 {
                        return invalid(format!(
                            "lair in '{}' spawns nothing",
                            room.short
                        ));
                    }
                    for name in &lair.monsters {
                        if self.monster(name).is_none() {
                            return invalid(format!(
                                "lair in '{}' names unknown monster '{name}'",
                                room.short
                            ));
                        }
                    }
                }
            }
        }

        if self.room_at(self.start).is_none() {
            return invalid(format!("start {} is not a room", self.start));
        }
        if let Some(arena) = self.arena {
            if self.room_at(arena).is_none() {
                return invalid(format!("arena {arena} is not a room"));
            }
        }

        for monster in &self.monsters {
            if self.monster_stats.get(monster.challenge).is_none() {
                return invalid(format!(
                    "no stats for challenge {} of '{}'",
                    monster.challenge, monster.name
                ));
            }
        }
        for spell in &self.spells {
            for class in &spell.classes {
                if !self.classes.iter().any(|c| &c.name == class) {
                    return invalid(format!(
                        "spell '{}' names unknown class '{class}'",
                        spell.name
                    ));
                }
            }
        }
        Ok(())
    }

    // -- Lookups ----------------------------------------------------------

    pub fn room_at(&self, loc: Location) -> Option<&Room> {
        let floor = self.floors.get(loc.floor)?;
        let cell = *floor.grid.get(loc.row)?.get(loc.col)?;
        cell.checked_sub(1).and_then(|i| floor.rooms.get(i))
    }

    /// Every room with its location, in floor, row, column order.
    pub fn rooms(&self) -> impl Iterator<Item = (Location, &Room)> {
        self.floors.iter().enumerate().flat_map(move |(f, floor)| {
            floor.grid.iter().enumerate().flat_map(move |(r, row)| {
                row.iter().enumerate().filter_map(move |(c, _)| {
                    let loc = Location::new(f, r, c);
                    self.room_at(loc).map(|room| (loc, room))
                })
            })
        })
    }

    /// Directions that lead to another room.
    pub fn exits(&self, loc: Location) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&dir| {
                loc.step(dir).and_then(|to| self.room_at(to)).is_some()
            })
            .collect()
    }

    pub fn monster(&self, name: &str) -> Option<&MonsterDef> {
        self.monsters.iter().find(|m| m.name == name)
    }

    pub fn spell(&self, name: &str) -> Option<&SpellDef> {
        self.spells.iter().find(|s| s.name == name)
    }

    pub fn key_item(&self, id: usize) -> Option<Item> {
        self.keys.get(id).map(|key| Item {
            name: key.name.clone(),
            weight: key.weight,
            value: 0,
            kind: ItemKind::Key { door: id },
        })
    }

    /// What a shop of this kind sells.
    pub fn stock(&self, kind: ShopKind) -> Vec<Item> {
        match kind {
            ShopKind::Armor => self.armors.iter().map(ArmorDef::to_item).collect(),
            ShopKind::Weapons => {
                self.weapons.iter().map(WeaponDef::to_item).collect()
            }
            ShopKind::Gear => self
                .gear
                .iter()
                .filter(|g| g.kind != GearKind::Service)
                .map(GearDef::to_item)
                .collect(),
            ShopKind::Training => self
                .gear
                .iter()
                .filter(|g| g.kind == GearKind::Service)
                .map(GearDef::to_item)
                .collect(),
            ShopKind::Spells => Vec::new(),
        }
    }
}

impl ShopKind {
    /// Whether a shop of this kind buys `item` back.
    pub fn buys(self, item: &Item) -> bool {
        match (self, &item.kind) {
            (Self::Armor, ItemKind::Armor { .. }) => true,
            (Self::Weapons, ItemKind::Weapon { .. }) => true,
            (Self::Gear, ItemKind::Gear { .. } | ItemKind::Spellbook { .. }) => {
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads_and_validates() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.room_at(catalog.start).is_some());
        assert_eq!(catalog.start, Location::new(1, 4, 2));
        assert_eq!(catalog.arena, Some(Location::new(1, 4, 3)));
        assert!(!catalog.monsters.is_empty());
    }

    #[test]
    fn test_builtin_has_every_shop_kind() {
        let catalog = Catalog::builtin().unwrap();
        for kind in [
            ShopKind::Armor,
            ShopKind::Weapons,
            ShopKind::Gear,
            ShopKind::Spells,
            ShopKind::Training,
        ] {
            assert!(
                catalog.rooms().any(|(_, r)| r.shop == Some(kind)),
                "missing {kind:?} shop"
            );
        }
    }

    #[test]
    fn test_room_at_zero_cell_is_none() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.room_at(Location::new(1, 0, 0)).is_none());
        assert!(catalog.room_at(Location::new(9, 0, 0)).is_none());
    }

    #[test]
    fn test_exits_from_start_lead_to_rooms() {
        let catalog = Catalog::builtin().unwrap();
        let exits = catalog.exits(catalog.start);
        assert!(exits.contains(&Direction::East));
        for dir in exits {
            let to = catalog.start.step(dir).unwrap();
            assert!(catalog.room_at(to).is_some());
        }
    }

    #[test]
    fn test_validate_rejects_grid_pointing_past_rooms() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.floors[0].grid[0][0] = 99;
        let err = catalog.validate().unwrap_err();
        assert!(matches!(err, WorldError::InvalidContent(_)));
    }

    #[test]
    fn test_validate_rejects_start_in_rock() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.start = Location::new(1, 0, 0);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_from_json_rejects_malformed_content() {
        let err = Catalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, WorldError::ContentParse(_)));
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let err = Catalog::from_path("/nonexistent/runemud.json").unwrap_err();
        assert!(matches!(err, WorldError::ContentIo { .. }));
    }

    #[test]
    fn test_stock_splits_gear_and_training() {
        let catalog = Catalog::builtin().unwrap();
        assert!(
            catalog
                .stock(ShopKind::Gear)
                .iter()
                .all(|i| i.kind != ItemKind::Service)
        );
        assert!(
            catalog
                .stock(ShopKind::Training)
                .iter()
                .all(|i| i.kind == ItemKind::Service)
        );
    }

    #[test]
    fn test_spell_describe_substitutes_placeholders() {
        let catalog = Catalog::builtin().unwrap();
        let spell = &catalog.spells[0];
        let text = spell.describe("goblin", 7);
        assert!(!text.contains("{target}"));
        assert!(!text.contains("{amount}"));
    }
}
