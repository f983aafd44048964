//! Everyday commands: talking, moving, character sheets, and handling
//! items.

use std::sync::Arc;
use std::time::Instant;

use runemud_protocol::SessionId;

use crate::WorldError;
use crate::dice::d20;
use crate::item::ItemKind;
use crate::rules::{
    article, format_coins, list_phrase, name_matches, ready_to_level,
    xp_threshold,
};
use crate::types::{Ability, Direction};
use crate::world::World;

const HELP: &[&str] = &[
    "Commands:",
    "  say <message>         - Says something out loud",
    "  look, l               - Describes the room and its exits",
    "  look <target>         - Examines a creature, item, direction, or your spellbook",
    "  go <exit>             - Moves through the exit specified",
    "  north, south, east, west, up, down (n, s, e, w, u, d)",
    "  attack, a <target>    - Attacks a creature in the room",
    "  cast <spell> [target] - Casts a spell you have learned",
    "  experience, xp        - Shows your experience",
    "  stats, st             - Shows your character sheet",
    "  health, hp            - Shows your hit points and mana",
    "  inventory, inv, i     - Lists what you are carrying",
    "  equip <item>          - Wields a weapon or wears armor",
    "  unequip <item>        - Removes a weapon or armor",
    "  get <item>            - Picks up an item",
    "  drop <item>           - Drops an item",
    "  list                  - Lists what a shop sells",
    "  list spells           - Lists the spells taught here",
    "  buy <item>            - Buys an item, or training",
    "  sell <item>           - Sells an item",
    "  learn <spell>         - Writes a spell into your spellbook",
    "  ring gong             - Summons a monster to the arena",
    "  who                   - Lists players in the game",
    "  quit                  - Leaves the game",
];

impl World {
    pub fn help(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        self.player_ref(id)?;
        for line in HELP {
            self.out.tell(id, *line);
        }
        Ok(())
    }

    pub fn say(
        &mut self,
        id: SessionId,
        args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let player = self.player_ref(id)?;
        let (name, loc) = (player.name.clone(), player.location);
        let text = args.trim();
        if text.is_empty() {
            self.out.tell(id, "Say what?");
            return Ok(());
        }
        let others = self.ids_at(loc, Some(id));
        self.out.tell_each(&others, &format!("{name} says: {text}"));
        self.out.tell(id, format!("You say: {text}"));
        Ok(())
    }

    /// Input that matches no command is spoken to whoever is in the room.
    pub fn speak(
        &mut self,
        id: SessionId,
        verb: &str,
        args: &str,
    ) -> Result<(), WorldError> {
        let player = self.player_ref(id)?;
        let (name, loc) = (player.name.clone(), player.location);
        let others = self.ids_at(loc, Some(id));
        if others.is_empty() {
            self.out
                .tell(id, "Sorry, that is not an appropriate command.");
            return Ok(());
        }
        let text = match args.trim() {
            "" => verb.to_string(),
            rest => format!("{verb} {rest}"),
        };
        self.out.tell_each(&others, &format!("{name} says: {text}"));
        self.out.tell(id, "--- Message Sent ---");
        Ok(())
    }

    pub fn who(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        self.player_ref(id)?;
        let names: Vec<&str> =
            self.players.values().map(|p| p.name.as_str()).collect();
        let text = format!("Players online: {}.", names.join(", "));
        self.out.tell(id, text);
        Ok(())
    }

    // -- Movement ---------------------------------------------------------

    /// `go <dir>` or a bare direction.
    pub fn go(
        &mut self,
        id: SessionId,
        args: &str,
        now: Instant,
    ) -> Result<(), WorldError> {
        let catalog = Arc::clone(&self.catalog);
        let player = self.players.get(&id).ok_or(WorldError::NoPlayer(id))?;

        let Some(dir) = Direction::parse(args) else {
            self.out.tell(id, "Go where?");
            return Ok(());
        };
        if player.is_fatigued(now) {
            self.out.tell(
                id,
                "Sorry, you'll have to rest a while before you can move.",
            );
            return Ok(());
        }

        let from = player.location;
        let Some((to, room)) = from
            .step(dir)
            .and_then(|to| catalog.room_at(to).map(|room| (to, room)))
        else {
            self.out.tell(
                id,
                format!("A mysterious force blocks your path to the {dir}."),
            );
            return Ok(());
        };

        if let Some(door) = room.door {
            let door_name = &catalog.doors[door].name;
            match player.has_key(door) {
                Some(key) => {
                    let text = format!("Your {} unlocks the {door_name}.", key.name);
                    self.out.tell(id, text);
                }
                None => {
                    self.out.tell(
                        id,
                        format!("The {door_name} blocks your passage."),
                    );
                    return Ok(());
                }
            }
        }

        let name = player.name.clone();
        let leaving = self.ids_at(from, Some(id));
        let left = match dir {
            Direction::Up | Direction::Down => {
                format!("{name} just went {dir}.")
            }
            _ => format!("{name} just left to the {dir}."),
        };
        self.out.tell_each(&leaving, &left);

        self.player_entry(id)?.location = to;
        tracing::debug!(%id, from = %from, to = %to, "player moved");

        let arriving = self.ids_at(to, Some(id));
        let arrived = match dir {
            Direction::Up => format!("{name} just arrived from below."),
            Direction::Down => format!("{name} just arrived from above."),
            _ => format!("{name} just arrived from the {}.", dir.opposite()),
        };
        self.out.tell_each(&arriving, &arrived);

        if let Some(trap) = &room.trap {
            let player =
                self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))?;
            let save =
                d20(&mut self.rng) + player.modifier(Ability::Dexterity);
            if save > trap.dc {
                self.out.tell(
                    id,
                    format!(
                        "You notice a {} just in time and step around it.",
                        trap.name
                    ),
                );
            } else {
                let damage = trap.damage.roll(&mut self.rng).max(1);
                player.hp -= damage;
                let down = player.hp < 1;
                self.out.tell(
                    id,
                    format!(
                        "You stumble onto a {} and take {damage} damage!",
                        trap.name
                    ),
                );
                if down {
                    return self.knock_out(id, now);
                }
            }
        }

        self.glance(id, "", now)
    }

    // -- Character sheet --------------------------------------------------

    pub fn experience(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let player = self.player_ref(id)?;
        let mut lines = vec![format!("You have {} experience.", player.xp)];
        let next = player.level + 1;
        if ready_to_level(player.level, player.xp) {
            lines.push(format!("You are ready to train for level {next}."));
        } else if let Some(needed) = xp_threshold(next) {
            lines.push(format!(
                "You need {} more experience to reach level {next}.",
                needed.saturating_sub(player.xp)
            ));
        }
        for line in lines {
            self.out.tell(id, line);
        }
        Ok(())
    }

    pub fn stats(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let p = self.player_ref(id)?;
        let mut lines = vec![
            format!("Name:         {}", p.name),
            format!("Species:      {}", self.catalog.species[p.species].name),
            format!("Class:        {}", self.catalog.classes[p.class].name),
            format!("Level:        {}", p.level),
            format!("Proficiency:  {}", p.proficiency),
            format!("Experience:   {}", p.xp),
            String::new(),
        ];
        for ability in Ability::ALL {
            lines.push(format!(
                "{:<14}{}",
                format!("{}:", ability.name()),
                p.abilities.get(ability)
            ));
        }
        lines.extend([
            String::new(),
            format!("Mana:         {} / {}", p.mana, p.max_mana),
            format!("Hit Points:   {} / {}", p.hp, p.max_hp),
            format!("Status:       {}", p.status.name()),
            format!("Armor Class:  {}", p.armor_class()),
            String::new(),
            format!("Weapon:       {}", p.equipment.weapon_name()),
            format!("Armor:        {}", p.equipment.armor_name()),
            format!("Coins:        {}", format_coins(p.coins)),
            format!(
                "Encumbrance:  {} / {} lbs",
                p.carried_weight(),
                p.carry_limit()
            ),
        ]);
        let items: Vec<&str> =
            p.inventory.iter().map(|i| i.name.as_str()).collect();
        lines.push(format!(
            "Inventory:    {}",
            if items.is_empty() { "nothing".to_string() } else { items.join(", ") }
        ));
        for line in lines {
            self.out.tell(id, line);
        }
        Ok(())
    }

    pub fn health(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let p = self.player_ref(id)?;
        let lines = [
            format!("Magic Points: {} / {}", p.mana, p.max_mana),
            format!("Hit Points:   {} / {}", p.hp, p.max_hp),
            format!("Status:       {}", p.status.name()),
        ];
        for line in lines {
            self.out.tell(id, line);
        }
        Ok(())
    }

    // -- Items ------------------------------------------------------------

    pub fn inventory(
        &mut self,
        id: SessionId,
        _args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let player = self.player_ref(id)?;
        let names: Vec<&str> =
            player.inventory.iter().map(|i| i.name.as_str()).collect();
        let text = if names.is_empty() {
            "You aren't carrying anything.".to_string()
        } else {
            format!("You are carrying {}.", list_phrase(&names))
        };
        self.out.tell(id, text);
        Ok(())
    }

    pub fn equip(
        &mut self,
        id: SessionId,
        args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let catalog = Arc::clone(&self.catalog);
        let player =
            self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))?;
        let query = args.trim();
        if query.is_empty() {
            self.out
                .tell(id, "You need to specify what you want to equip.");
            return Ok(());
        }
        let Some(index) = player.find_item(query) else {
            self.out.tell(id, format!("You don't seem to have {query}."));
            return Ok(());
        };
        let item = &player.inventory[index];
        if !item.is_equippable() {
            self.out.tell(id, format!("You can't equip {}.", item.name));
            return Ok(());
        }
        if !catalog.classes[player.class].can_equip(item) {
            self.out.tell(id, "Sorry, you may not equip that.");
            return Ok(());
        }

        let item = player.inventory.remove(index);
        let name = item.name.clone();
        let slot = if matches!(item.kind, ItemKind::Weapon { .. }) {
            &mut player.equipment.weapon
        } else {
            &mut player.equipment.armor
        };
        if let Some(old) = slot.replace(item) {
            self.out.tell(id, format!("You just unequipped {}.", old.name));
            player.inventory.push(old);
        }
        self.out.tell(id, format!("You equipped {name}."));
        Ok(())
    }

    pub fn unequip(
        &mut self,
        id: SessionId,
        args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let player =
            self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))?;
        let query = args.trim();
        if query.is_empty() {
            self.out
                .tell(id, "You need to specify what you want to unequip.");
            return Ok(());
        }
        let equipment = &mut player.equipment;
        let slot = [&mut equipment.weapon, &mut equipment.armor]
            .into_iter()
            .find(|slot| matches!(slot, Some(i) if name_matches(&i.name, query)));
        match slot.and_then(Option::take) {
            Some(item) => {
                self.out
                    .tell(id, format!("You just unequipped {}.", item.name));
                player.inventory.push(item);
            }
            None => self
                .out
                .tell(id, format!("You don't seem to have {query} equipped.")),
        }
        Ok(())
    }

    pub fn pick_up(
        &mut self,
        id: SessionId,
        args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let query = args.trim();
        let player = self.players.get(&id).ok_or(WorldError::NoPlayer(id))?;
        let loc = player.location;
        let floor = self.floor_items.entry(loc).or_default();
        let Some(index) = floor
            .iter()
            .position(|i| name_matches(&i.name, query))
        else {
            self.out.tell(id, "Sorry, but no such item is here.");
            return Ok(());
        };
        if !player.can_carry(&floor[index]) {
            let text =
                format!("The {} is too heavy for you to carry.", floor[index].name);
            self.out.tell(id, text);
            return Ok(());
        }
        let item = floor.remove(index);
        let name = player.name.clone();
        let noun = format!("{} {}", article(&item.name), item.name);
        self.player_entry(id)?.inventory.push(item);
        self.out.tell(id, format!("You picked up {noun}."));
        let others = self.ids_at(loc, Some(id));
        self.out
            .tell_each(&others, &format!("{name} picked up {noun}."));
        Ok(())
    }

    pub fn drop_item(
        &mut self,
        id: SessionId,
        args: &str,
        _now: Instant,
    ) -> Result<(), WorldError> {
        let cap = self.rules.max_floor_items;
        let player =
            self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))?;
        let Some(index) = player.find_item(args) else {
            self.out.tell(id, "Sorry, you don't seem to have that item.");
            return Ok(());
        };
        let loc = player.location;
        let floor = self.floor_items.entry(loc).or_default();
        if floor.len() >= cap {
            self.out.tell(id, "You can't drop any more items here.");
            return Ok(());
        }
        let item = player.inventory.remove(index);
        let name = player.name.clone();
        let noun = format!("{} {}", article(&item.name), item.name);
        self.out.tell(id, format!("You dropped your {}.", item.name));
        floor.push(item);
        let others = self.ids_at(loc, Some(id));
        self.out.tell_each(&others, &format!("{name} dropped {noun}."));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::item::Item;
    use crate::rules::RulesConfig;
    use crate::test_support::{join, lines};
    use crate::types::Location;

    fn setup() -> (World, SessionId, Instant) {
        let mut world =
            World::with_seed(Catalog::builtin().unwrap(), RulesConfig::default(), 4);
        let now = Instant::now();
        let id = join(&mut world, 1, "aria", now);
        (world, id, now)
    }

    fn torch() -> Item {
        Item {
            name: "torch".into(),
            weight: 1,
            value: 1,
            kind: ItemKind::Gear { light: true },
        }
    }

    #[test]
    fn test_speak_alone_is_not_a_command() {
        let (mut world, id, _) = setup();
        world.speak(id, "dance", "").unwrap();
        assert_eq!(
            lines(&mut world, id),
            ["Sorry, that is not an appropriate command."]
        );
    }

    #[test]
    fn test_speak_with_company_is_heard() {
        let (mut world, aria, now) = setup();
        let bram = join(&mut world, 2, "bram", now);
        world.speak(aria, "hello", "there friend").unwrap();
        assert_eq!(lines(&mut world, aria), ["--- Message Sent ---"]);
        world.speak(aria, "hello", "").unwrap();
        let heard = lines(&mut world, bram);
        assert_eq!(heard, ["Aria says: hello"]);
    }

    #[test]
    fn test_go_blocked_direction() {
        let (mut world, id, now) = setup();
        world.go(id, "up", now).unwrap();
        assert_eq!(
            lines(&mut world, id),
            ["A mysterious force blocks your path to the up."]
        );
    }

    #[test]
    fn test_go_moves_and_notifies_both_rooms() {
        let (mut world, aria, now) = setup();
        let bram = join(&mut world, 2, "bram", now);
        let east = Location::new(1, 4, 3);
        world.player_mut(bram).unwrap().location = east;
        world.go(aria, "east", now).unwrap();
        assert_eq!(world.player(aria).unwrap().location, east);
        assert_eq!(
            lines(&mut world, bram),
            ["Aria just arrived from the west."]
        );
        let seen = lines(&mut world, aria);
        assert_eq!(seen[0], "You are in the arena.");
        assert_eq!(seen[1], "Bram is here with you.");
    }

    #[test]
    fn test_go_while_fatigued_is_refused() {
        let (mut world, id, now) = setup();
        world.player_mut(id).unwrap().tire(now);
        world.go(id, "north", now).unwrap();
        assert_eq!(
            lines(&mut world, id),
            ["Sorry, you'll have to rest a while before you can move."]
        );
        assert_eq!(world.player(id).unwrap().location, Location::new(1, 4, 2));
    }

    #[test]
    fn test_go_locked_door_needs_key() {
        let (mut world, id, now) = setup();
        world.player_mut(id).unwrap().location = Location::new(2, 6, 4);
        world.go(id, "south", now).unwrap();
        assert_eq!(lines(&mut world, id), ["The iron gate blocks your passage."]);

        let key = world.catalog().key_item(0).unwrap();
        world.player_mut(id).unwrap().inventory.push(key);
        world.go(id, "s", now).unwrap();
        assert_eq!(
            lines(&mut world, id)[0],
            "Your iron key unlocks the iron gate."
        );
        assert_eq!(world.player(id).unwrap().location, Location::new(2, 7, 4));
    }

    #[test]
    fn test_get_and_drop_move_items() {
        let (mut world, id, now) = setup();
        let here = world.player(id).unwrap().location;
        world.place_item(here, torch());
        world.pick_up(id, "torch", now).unwrap();
        assert_eq!(lines(&mut world, id), ["You picked up a torch."]);
        assert!(world.floor_items(here).is_empty());

        world.drop_item(id, "torch", now).unwrap();
        assert_eq!(lines(&mut world, id), ["You dropped your torch."]);
        assert_eq!(world.floor_items(here).len(), 1);
    }

    #[test]
    fn test_get_missing_item() {
        let (mut world, id, now) = setup();
        world.pick_up(id, "sword", now).unwrap();
        assert_eq!(lines(&mut world, id), ["Sorry, but no such item is here."]);
    }

    #[test]
    fn test_drop_on_full_floor_is_refused() {
        let (mut world, id, now) = setup();
        let here = world.player(id).unwrap().location;
        for _ in 0..RulesConfig::default().max_floor_items {
            world.place_item(here, torch());
        }
        world.player_mut(id).unwrap().inventory.push(torch());
        world.drop_item(id, "torch", now).unwrap();
        assert_eq!(
            lines(&mut world, id),
            ["You can't drop any more items here."]
        );
        assert_eq!(world.player(id).unwrap().inventory.len(), 1);
    }

    #[test]
    fn test_inventory_lists_with_articles() {
        let (mut world, id, now) = setup();
        world.inventory(id, "", now).unwrap();
        assert_eq!(lines(&mut world, id), ["You aren't carrying anything."]);
        let key = world.catalog().key_item(0).unwrap();
        let player = world.player_mut(id).unwrap();
        player.inventory.push(torch());
        player.inventory.push(key);
        world.inventory(id, "", now).unwrap();
        assert_eq!(
            lines(&mut world, id),
            ["You are carrying a torch and an iron key."]
        );
    }

    #[test]
    fn test_equip_swaps_previous_weapon_into_inventory() {
        let (mut world, id, now) = setup();
        let sword = world.catalog().weapons[5].to_item();
        world.player_mut(id).unwrap().inventory.push(sword);
        world.equip(id, "longsword", now).unwrap();
        assert_eq!(
            lines(&mut world, id),
            ["You just unequipped club.", "You equipped longsword."]
        );
        let player = world.player(id).unwrap();
        assert_eq!(player.equipment.weapon_name(), "longsword");
        assert_eq!(player.inventory[0].name, "club");
    }

    #[test]
    fn test_equip_non_equippable() {
        let (mut world, id, now) = setup();
        world.player_mut(id).unwrap().inventory.push(torch());
        world.equip(id, "torch", now).unwrap();
        assert_eq!(lines(&mut world, id), ["You can't equip torch."]);
    }

    #[test]
    fn test_unequip_returns_item() {
        let (mut world, id, now) = setup();
        world.unequip(id, "club", now).unwrap();
        assert_eq!(lines(&mut world, id), ["You just unequipped club."]);
        world.unequip(id, "club", now).unwrap();
        assert_eq!(
            lines(&mut world, id),
            ["You don't seem to have club equipped."]
        );
    }

    #[test]
    fn test_stats_shows_encumbrance() {
        let (mut world, id, now) = setup();
        world.stats(id, "", now).unwrap();
        let out = lines(&mut world, id);
        assert_eq!(out[0], "Name:         Aria");
        assert!(out.iter().any(|l| l.starts_with("Encumbrance:") && l.ends_with("lbs")));
        assert!(out.iter().any(|l| l == "Strength:     16"));
    }

    #[test]
    fn test_health_three_lines() {
        let (mut world, id, now) = setup();
        world.health(id, "", now).unwrap();
        let out = lines(&mut world, id);
        assert_eq!(out.len(), 3);
        assert_eq!(out[2], "Status:       Healthy");
    }

    #[test]
    fn test_who_lists_players() {
        let (mut world, aria, now) = setup();
        join(&mut world, 2, "bram", now);
        world.who(aria, "", now).unwrap();
        assert_eq!(lines(&mut world, aria), ["Players online: Aria, Bram."]);
    }
}
