//! Looking around: room views and examining things.

use std::time::Instant;

use runemud_protocol::SessionId;

use crate::WorldError;
use crate::item::ItemKind;
use crate::rules::{health_status, list_phrase, name_matches};
use crate::types::{Direction, Location};
use crate::world::World;

impl World {
    /// Whether anyone can see at `loc`: the room is lit or someone there
    /// carries a light.
    pub fn is_lit(&self, loc: Location) -> bool {
        let dark = self.catalog.room_at(loc).is_some_and(|r| r.dark);
        !dark
            || self
                .players
                .values()
                .any(|p| p.location == loc && p.carries_light())
    }

    /// Empty line: the short view of the room and who and what is in it.
    pub fn glance(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let (loc, room) = self.room_of(id)?;
        if !self.is_lit(loc) {
            self.out.tell(id, "It's too dark to see.");
            return Ok(());
        }
        let mut lines = vec![room.short.clone()];

        let monsters: Vec<&str> =
            self.monsters_at(loc).map(|m| m.name.as_str()).collect();
        if !monsters.is_empty() {
            lines.push(format!("There is {} here.", list_phrase(&monsters)));
        }

        let others: Vec<&str> = self
            .players
            .values()
            .filter(|p| p.location == loc && p.session != id)
            .map(|p| p.name.as_str())
            .collect();
        lines.push(match others.as_slice() {
            [] => "There is nobody here.".to_string(),
            [one] => format!("{one} is here with you."),
            many => format!("{} are here with you.", many.join(", ")),
        });

        let items: Vec<&str> =
            self.floor_items(loc).iter().map(|i| i.name.as_str()).collect();
        lines.push(if items.is_empty() {
            "There is nothing on the floor.".to_string()
        } else {
            format!("There is {} lying on the floor.", list_phrase(&items))
        });

        for line in lines {
            self.out.tell(id, line);
        }
        Ok(())
    }

    /// `look` alone shows the long description and exits; `look <thing>`
    /// examines a direction, creature, item, or the spellbook.
    pub fn look(
        &mut self,
        id: SessionId,
        args: &str,
        now: Instant,
    ) -> Result<(), WorldError> {
        let target = args.trim();
        if !target.is_empty() {
            return self.look_at(id, target, now);
        }
        let (loc, room) = self.room_of(id)?;
        if !self.is_lit(loc) {
            self.out.tell(id, "It's too dark to see.");
            return Ok(());
        }
        let long = room.long.clone();
        let exits: Vec<&str> = self
            .catalog
            .exits(loc)
            .into_iter()
            .map(Direction::name)
            .collect();
        self.out.tell(id, long);
        self.out.tell(
            id,
            if exits.is_empty() {
                "There are no obvious exits.".to_string()
            } else {
                format!("Exits: {}.", exits.join(", "))
            },
        );
        Ok(())
    }

    fn look_at(
        &mut self,
        id: SessionId,
        target: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let player = self.player_ref(id)?;
        let loc = player.location;

        if name_matches("spellbook", target) && target.len() >= 5 {
            let text = match player.spellbook() {
                None => "Sorry, you don't have a spellbook.".to_string(),
                Some(spells) if spells.is_empty() => {
                    "Your spellbook is empty.".to_string()
                }
                Some(spells) => {
                    format!("Your spellbook contains: {}.", spells.join(", "))
                }
            };
            self.out.tell(id, text);
            return Ok(());
        }

        if !self.is_lit(loc) {
            self.out.tell(id, "It's too dark to see.");
            return Ok(());
        }

        if let Some(dir) = Direction::parse(target) {
            let text = match loc.step(dir).and_then(|to| self.catalog.room_at(to))
            {
                Some(next) => next.long.clone(),
                None => format!("You can't see anything to the {dir}."),
            };
            self.out.tell(id, text);
            return Ok(());
        }

        let monster = self
            .monsters_at(loc)
            .find(|m| name_matches(&m.name, target))
            .map(|monster| {
                format!(
                    "{} The {} appears to be {}.",
                    monster.description,
                    monster.name,
                    health_status(monster.hp, monster.max_hp)
                )
            });
        if let Some(text) = monster {
            self.out.tell(id, text);
            return Ok(());
        }

        if let Some(other) = self
            .players
            .values()
            .find(|p| p.location == loc && name_matches(&p.name, target))
        {
            let text = format!(
                "{} the {} {} appears to be {}.",
                other.name,
                self.catalog.species[other.species].name,
                self.catalog.classes[other.class].name,
                health_status(other.hp, other.max_hp)
            );
            self.out.tell(id, text);
            return Ok(());
        }

        let item = player
            .inventory
            .iter()
            .chain(player.equipment.weapon.iter())
            .chain(player.equipment.armor.iter())
            .chain(self.floor_items(loc))
            .find(|i| name_matches(&i.name, target));
        let text = match item.map(|i| (&i.name, &i.kind)) {
            Some((name, ItemKind::Weapon { damage, enchantment, .. })) => {
                match enchantment {
                    0 => format!("A {name} that deals {damage} damage."),
                    e => format!("A {name} that deals {damage}+{e} damage."),
                }
            }
            Some((name, ItemKind::Armor { base_ac, .. })) => {
                format!("A suit of {name} with a base armor class of {base_ac}.")
            }
            Some((name, _)) => format!("An ordinary {name}."),
            None => format!("You don't see {target} nearby."),
        };
        self.out.tell(id, text);
        Ok(())
    }
}
