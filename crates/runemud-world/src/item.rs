//! Items carried, worn, sold, and dropped.

use crate::dice::Dice;
use crate::rules::ability_modifier;
use crate::types::{Hands, Size};

/// Unarmed attacks.
pub const UNARMED_DAMAGE: Dice = Dice::new(1, 2);
pub const UNARMED_NAME: &str = "bare hands";

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    /// Pounds.
    pub weight: u32,
    /// Copper coins.
    pub value: u64,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Weapon {
        damage: Dice,
        size: Size,
        hands: Hands,
        /// Bonus to attack damage added by enchantment spells.
        enchantment: i32,
    },
    Armor {
        base_ac: i32,
        size: Size,
    },
    /// Opens the door with the same id.
    Key {
        door: usize,
    },
    Spellbook {
        spells: Vec<String>,
    },
    Gear {
        light: bool,
    },
    /// Bought and used up on the spot (training).
    Service,
}

impl Item {
    /// Whether this item lights a dark room for everyone present.
    pub fn gives_light(&self) -> bool {
        matches!(self.kind, ItemKind::Gear { light: true })
    }

    pub fn is_equippable(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon { .. } | ItemKind::Armor { .. })
    }

    /// Weapon or armor size, if this is either.
    pub fn size(&self) -> Option<Size> {
        match self.kind {
            ItemKind::Weapon { size, .. } | ItemKind::Armor { size, .. } => {
                Some(size)
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// What a creature wields and wears. `None` is an empty slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
}

impl Equipment {
    /// Armor class for a wearer with this dexterity score.
    ///
    /// Light armor adds the full Dex modifier, medium at most +2, heavy
    /// none. No armor is `10 + Dex`.
    pub fn armor_class(&self, dexterity: i32) -> i32 {
        let dex = ability_modifier(dexterity);
        match self.armor.as_ref().map(|a| &a.kind) {
            Some(ItemKind::Armor { base_ac, size }) => match size {
                Size::Light => base_ac + dex,
                Size::Medium => base_ac + dex.min(2),
                Size::Heavy => *base_ac,
            },
            _ => 10 + dex,
        }
    }

    /// Damage dice and enchantment bonus of the wielded weapon.
    pub fn weapon_damage(&self) -> (Dice, i32) {
        match self.weapon.as_ref().map(|w| &w.kind) {
            Some(ItemKind::Weapon {
                damage,
                enchantment,
                ..
            }) => (*damage, *enchantment),
            _ => (UNARMED_DAMAGE, 0),
        }
    }

    pub fn weapon_name(&self) -> &str {
        self.weapon.as_ref().map_or(UNARMED_NAME, |w| w.name.as_str())
    }

    pub fn armor_name(&self) -> &str {
        self.armor.as_ref().map_or("none", |a| a.name.as_str())
    }

    pub fn weight(&self) -> u32 {
        self.weapon.as_ref().map_or(0, |w| w.weight)
            + self.armor.as_ref().map_or(0, |a| a.weight)
    }

    /// Empties both slots, returning whatever was in them.
    pub fn strip(&mut self) -> Vec<Item> {
        self.weapon.take().into_iter().chain(self.armor.take()).collect()
    }
}
