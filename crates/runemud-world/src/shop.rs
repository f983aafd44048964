//! Commerce: shop listings, buying, selling, training, learning spells,
//! and the arena gong.

use std::sync::Arc;
use std::time::Instant;

use rand::seq::IndexedRandom;
use runemud_protocol::SessionId;

use crate::WorldError;
use crate::catalog::{ShopKind, SpellDef};
use crate::item::{Item, ItemKind};
use crate::rules::{
    format_coins, max_spell_level, name_matches, ready_to_level,
    training_cost,
};
use crate::types::Size;
use crate::world::World;

const TABLE_EDGE: &str = "+======================+========+";
const TABLE_RULE: &str = "+----------------------+--------+";

/// Monsters of a lower challenge than this answer the gong.
const GONG_MAX_CHALLENGE: usize = 2;

impl World {
    /// `list`: the stock of the shop here. `list spells` shows spells.
    pub fn list(
        &mut self,
        id: SessionId,
        args: &str,
        now: Instant,
    ) -> Result<(), WorldError> {
        if name_matches("spells", args) {
            return self.list_spells(id, args, now);
        }
        let (_, room) = self.room_of(id)?;
        let Some(kind) = room.shop else {
            self.out.tell(id, "There is nothing for sale here.");
            return Ok(());
        };
        if kind == ShopKind::Spells {
            return self.list_spells(id, args, now);
        }
        let level = self.player_ref(id)?.level;
        let stock = self.catalog.stock(kind);

        let mut lines = vec![
            TABLE_EDGE.to_string(),
            table_row("Item", "Price"),
            TABLE_EDGE.to_string(),
        ];
        match kind {
            ShopKind::Armor | ShopKind::Weapons => {
                let mut first = true;
                for size in Size::ALL {
                    let mut group: Vec<&Item> =
                        stock.iter().filter(|i| i.size() == Some(size)).collect();
                    if group.is_empty() {
                        continue;
                    }
                    group.sort_by_key(|i| i.value);
                    if !first {
                        lines.push(TABLE_RULE.to_string());
                    }
                    first = false;
                    lines.extend(
                        group
                            .iter()
                            .map(|i| table_row(&i.name, &format_coins(i.value))),
                    );
                }
            }
            ShopKind::Training => {
                for item in &stock {
                    let price = training_cost(level, item.value);
                    lines.push(table_row(&item.name, &format_coins(price)));
                }
            }
            ShopKind::Gear | ShopKind::Spells => {
                let mut items: Vec<&Item> = stock.iter().collect();
                items.sort_by_key(|i| i.value);
                lines.extend(
                    items
                        .iter()
                        .map(|i| table_row(&i.name, &format_coins(i.value))),
                );
            }
        }
        lines.push(TABLE_EDGE.to_string());
        for line in lines {
            self.out.tell(id, line);
        }
        Ok(())
    }

    /// `list spells`: spells taught here that this character may learn.
    pub fn list_spells(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let player = self.player_ref(id)?;
        let class = &self.catalog.classes[player.class];
        if !class.magic {
            self.out.tell(id, "Sorry, your class cannot use magic.");
            return Ok(());
        }
        let (_, room) = self.room_of(id)?;
        if room.shop != Some(ShopKind::Spells) {
            self.out.tell(id, "There are no spells taught here.");
            return Ok(());
        }
        let mut spells: Vec<&SpellDef> = self
            .catalog
            .spells
            .iter()
            .filter(|s| s.classes.contains(&class.name))
            .collect();
        spells.sort_by_key(|s| (s.level, s.value));

        let mut lines = vec![
            TABLE_EDGE.to_string(),
            table_row("Spell", "Price"),
            TABLE_EDGE.to_string(),
        ];
        lines.extend(
            spells
                .iter()
                .map(|s| table_row(&s.name, &format_coins(s.value))),
        );
        lines.push(TABLE_EDGE.to_string());
        for line in lines {
            self.out.tell(id, line);
        }
        Ok(())
    }

    /// `buy <item>`, or `buy training` at a guild.
    pub fn buy(
        &mut self,
        id: SessionId,
        args: &str,
        now: Instant,
    ) -> Result<(), WorldError> {
        let catalog = Arc::clone(&self.catalog);
        let query = args.trim();
        let (_, room) = self.room_of(id)?;
        let Some(kind) = room.shop else {
            self.out.tell(id, "There is nothing for sale here.");
            return Ok(());
        };
        match kind {
            ShopKind::Training => return self.train(id, query, now),
            ShopKind::Spells => return self.learn(id, query, now),
            _ => {}
        }

        let player =
            self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))?;
        let Some(item) = catalog
            .stock(kind)
            .into_iter()
            .find(|i| name_matches(&i.name, query))
        else {
            self.out.tell(id, format!("This shop doesn't offer {query}."));
            return Ok(());
        };
        let class = &catalog.classes[player.class];
        if item.is_equippable() && !class.can_equip(&item) {
            self.out
                .tell(id, format!("Sorry, you may not equip {}.", item.name));
            return Ok(());
        }
        if player.coins < item.value {
            self.out.tell(id, format!("You can't afford {}.", item.name));
            return Ok(());
        }
        if !player.can_carry(&item) {
            self.out.tell(
                id,
                format!("The {} is too heavy for you to carry.", item.name),
            );
            return Ok(());
        }
        player.coins -= item.value;
        let text = format!(
            "You just purchased {} for {}.",
            item.name,
            format_coins(item.value)
        );
        player.inventory.push(item);
        self.out.tell(id, text);
        Ok(())
    }

    /// `buy training`: level up when the experience is there.
    pub fn train(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let catalog = Arc::clone(&self.catalog);
        let (_, room) = self.room_of(id)?;
        let service = match room.shop {
            Some(ShopKind::Training) => catalog
                .stock(ShopKind::Training)
                .into_iter()
                .find(|i| i.kind == ItemKind::Service),
            _ => None,
        };
        let Some(service) = service else {
            self.out.tell(id, "There is no one here to train you.");
            return Ok(());
        };

        let player =
            self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))?;
        if !ready_to_level(player.level, player.xp) {
            self.out.tell(id, "You are not ready for training, yet.");
            return Ok(());
        }
        let cost = training_cost(player.level, service.value);
        if player.coins < cost {
            self.out.tell(id, format!("You can't afford {}.", service.name));
            return Ok(());
        }
        player.coins -= cost;
        let improved =
            player.level_up(&catalog.classes[player.class], &mut self.rng);
        tracing::info!(%id, name = %player.name, level = player.level, "player levelled up");

        let mut lines = vec![
            format!(
                "You just purchased {} for {}.",
                service.name,
                format_coins(cost)
            ),
            format!("You are now level {}.", player.level),
        ];
        for ability in improved {
            lines.push(format!(
                "Your {} increased to {}.",
                ability.name(),
                player.abilities.get(ability)
            ));
        }
        for line in lines {
            self.out.tell(id, line);
        }
        Ok(())
    }

    /// `sell <item>` to a merchant who deals in that kind of thing.
    pub fn sell(
        &mut self,
        id: SessionId,
        args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let (_, room) = self.room_of(id)?;
        let Some(kind) = room.shop else {
            self.out.tell(id, "Sorry, you can't do that here.");
            return Ok(());
        };
        let player =
            self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))?;
        let Some(index) = player.find_item(args) else {
            self.out.tell(id, "Sorry, you don't seem to have that.");
            return Ok(());
        };
        if !kind.buys(&player.inventory[index]) {
            let text = format!(
                "The merchant doesn't want {}.",
                player.inventory[index].name
            );
            self.out.tell(id, text);
            return Ok(());
        }
        let item = player.inventory.remove(index);
        player.coins += item.value;
        self.out.tell(
            id,
            format!(
                "You just sold {} for {}.",
                item.name,
                format_coins(item.value)
            ),
        );
        Ok(())
    }

    /// `learn <spell>`: writes a spell into the carried spellbook.
    pub fn learn(
        &mut self,
        id: SessionId,
        args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let catalog = Arc::clone(&self.catalog);
        let query = args.trim();
        let (_, room) = self.room_of(id)?;
        if room.shop != Some(ShopKind::Spells) {
            self.out.tell(id, "Sorry, you can't do that here.");
            return Ok(());
        }
        let Some(spell) =
            catalog.spells.iter().find(|s| name_matches(&s.name, query))
        else {
            self.out.tell(id, format!("This shop doesn't offer {query}."));
            return Ok(());
        };

        let player =
            self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))?;
        let class = &catalog.classes[player.class];
        if !spell.classes.contains(&class.name)
            || spell.level > max_spell_level(player.level)
        {
            self.out
                .tell(id, format!("Sorry, you may not learn {}.", spell.name));
            return Ok(());
        }
        let coins = player.coins;
        let Some(book) = player.spellbook_mut() else {
            self.out.tell(id, "Sorry, you don't have a spellbook.");
            return Ok(());
        };
        if book.contains(&spell.name) {
            self.out.tell(id, format!("You already know {}.", spell.name));
            return Ok(());
        }
        if coins < spell.value {
            self.out
                .tell(id, format!("You can't afford to learn {}.", spell.name));
            return Ok(());
        }
        book.push(spell.name.clone());
        player.coins -= spell.value;
        self.out.tell(
            id,
            format!(
                "You just learned {} for {}.",
                spell.name,
                format_coins(spell.value)
            ),
        );
        Ok(())
    }

    /// `ring gong`: summons a weak monster into the arena.
    pub fn ring_gong(
        &mut self,
        id: SessionId,
        args: &str,
        now: Instant,
    ) -> Result<(), WorldError> {
        let catalog = Arc::clone(&self.catalog);
        let player = self.player_ref(id)?;
        let (name, loc) = (player.name.clone(), player.location);
        if !name_matches("gong", args) {
            self.out.tell(id, "Ring what?");
            return Ok(());
        }
        let Some(arena) = catalog.arena else {
            self.out.tell(id, "There is no gong to ring.");
            return Ok(());
        };

        self.out.tell(id, "You ring the gong.");
        let others = self.ids_at(loc, Some(id));
        self.out
            .tell_each(&others, &format!("{name} rings the gong."));

        if self.monsters.len() >= self.rules.max_gong_monsters {
            self.out.tell(id, "The gong echoes, but nothing answers.");
            return Ok(());
        }
        let weak: Vec<&str> = catalog
            .monsters
            .iter()
            .filter(|m| m.challenge < GONG_MAX_CHALLENGE)
            .map(|m| m.name.as_str())
            .collect();
        if let Some(&summoned) = weak.choose(&mut self.rng) {
            self.spawn_monster(summoned, arena, None, now);
        }
        Ok(())
    }
}

fn table_row(name: &str, price: &str) -> String {
    format!("| {name:<21}| {price:<7}|")
}
