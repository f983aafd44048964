//! Fighting: player attacks and spells, monster aggression, kills, and
//! knock-outs.

use std::sync::Arc;
use std::time::Instant;

use rand::seq::IndexedRandom;
use runemud_protocol::SessionId;
use runemud_tick::Cooldown;

use crate::WorldError;
use crate::catalog::SpellKind;
use crate::dice::d20;
use crate::item::ItemKind;
use crate::monster::{Monster, MonsterId};
use crate::player::Ward;
use crate::rules::{article, format_coins, last_word, name_matches, xp_for_damage};
use crate::types::{Ability, Location};
use crate::world::World;

const EXHAUSTED: &str =
    "You are still physically exhausted from your previous activities!";

/// How long a protective spell lasts, in action intervals.
const WARD_INTERVALS: u32 = 10;

impl World {
    // -- Player offence ---------------------------------------------------

    /// `attack <target>`: a melee swing at a random matching monster.
    pub fn attack(
        &mut self,
        id: SessionId,
        args: &str,
        now: Instant,
    ) -> Result<(), WorldError> {
        let query = args.trim();
        let player = self.players.get(&id).ok_or(WorldError::NoPlayer(id))?;
        if query.is_empty() {
            self.out.tell(id, "Attack what?");
            return Ok(());
        }
        if player.is_fatigued(now) {
            self.out.tell(id, EXHAUSTED);
            return Ok(());
        }
        let loc = player.location;
        let targets: Vec<MonsterId> = self
            .monsters_at(loc)
            .filter(|m| name_matches(&m.name, query))
            .map(|m| m.id)
            .collect();
        let Some(&target) = targets.choose(&mut self.rng) else {
            self.out
                .tell(id, format!("Sorry, you don't see {query} nearby."));
            return Ok(());
        };
        let Some(monster) = self.monsters.get(&target) else {
            return Ok(());
        };
        let (monster_name, monster_ac) = (monster.name.clone(), monster.armor_class());

        let player =
            self.players.get_mut(&id).ok_or(WorldError::NoPlayer(id))?;
        let strength = player.modifier(Ability::Strength);
        let roll = d20(&mut self.rng) + strength + player.proficiency;
        player.tire(now);
        let name = player.name.clone();
        let others = self.ids_at(loc, Some(id));

        if roll > monster_ac {
            let (dice, bonus) = self
                .player_ref(id)?
                .equipment
                .weapon_damage();
            let damage = (dice.roll(&mut self.rng) + strength + bonus).max(1);
            self.out.tell(
                id,
                format!("Your attack hits the {monster_name} for {damage} damage."),
            );
            self.out
                .tell_each(&others, &format!("{name} hits the {monster_name}."));
            self.wound_monster(id, target, damage, now)?;
        } else {
            self.out.tell(
                id,
                format!("Your poorly executed attack misses the {monster_name}."),
            );
            self.out.tell_each(
                &others,
                &format!("{name} swings at the {monster_name} and misses."),
            );
        }
        Ok(())
    }

    /// `cast <spell> [target]`.
    pub fn cast(
        &mut self,
        id: SessionId,
        args: &str,
        now: Instant,
    ) -> Result<(), WorldError> {
        let catalog = Arc::clone(&self.catalog);
        let player = self.players.get(&id).ok_or(WorldError::NoPlayer(id))?;
        let args = args.trim();
        if args.is_empty() {
            self.out.tell(id, "Cast what?");
            return Ok(());
        }

        let known = player.spellbook().cloned().unwrap_or_default();
        let Some((spell_name, target)) = resolve_spell(&known, args) else {
            let first = args.split_whitespace().next().unwrap_or(args);
            self.out.tell(
                id,
                format!("Sorry, you don't seem to have learned {first}."),
            );
            return Ok(());
        };
        let Some(spell) = catalog.spell(&spell_name) else {
            self.out.tell(
                id,
                format!("Sorry, you don't seem to have learned {spell_name}."),
            );
            return Ok(());
        };
        if player.is_fatigued(now) {
            self.out.tell(id, EXHAUSTED);
            return Ok(());
        }
        let cost = spell.level as i32;
        if player.mana < cost {
            self.out.tell(
                id,
                format!("You don't have enough mana to cast {}.", spell.name),
            );
            return Ok(());
        }
        let loc = player.location;
        let caster = player.name.clone();
        let amount = spell.effect.roll(&mut self.rng).max(1);

        match spell.kind {
            SpellKind::Damage => {
                if target.is_empty() {
                    self.out.tell(id, format!("Cast {} at what?", spell.name));
                    return Ok(());
                }
                let victim = self
                    .monsters_at(loc)
                    .find(|m| name_matches(&m.name, target))
                    .map(|m| (m.id, m.name.clone()));
                let Some(victim) = victim else {
                    self.out
                        .tell(id, format!("Sorry, you don't see {target} nearby."));
                    return Ok(());
                };
                self.spend_cast(id, cost, now)?;
                self.out.tell(id, spell.describe(&victim.1, amount));
                let others = self.ids_at(loc, Some(id));
                self.out.tell_each(
                    &others,
                    &format!("{caster} casts {} at the {}.", spell.name, victim.1),
                );
                self.wound_monster(id, victim.0, amount, now)?;
            }
            SpellKind::Heal | SpellKind::Buff => {
                let recipient = if target.is_empty()
                    || matches!(target, "me" | "self")
                    || name_matches(&caster, target)
                {
                    Some(id)
                } else {
                    self.players
                        .values()
                        .find(|p| p.location == loc && name_matches(&p.name, target))
                        .map(|p| p.session)
                };
                let Some(recipient) = recipient else {
                    self.out
                        .tell(id, format!("Sorry, you don't see {target} nearby."));
                    return Ok(());
                };
                self.spend_cast(id, cost, now)?;
                let interval = self.rules.action_interval;
                let patient = self.player_entry(recipient)?;
                let shown = if spell.kind == SpellKind::Heal {
                    patient.heal(amount)
                } else {
                    patient.ward = Some(Ward {
                        bonus: amount,
                        expires: Cooldown::new(interval * WARD_INTERVALS, now),
                    });
                    amount
                };
                let patient_name = patient.name.clone();
                self.out.tell(id, spell.describe(&patient_name, shown));
                if recipient != id {
                    self.out.tell(
                        recipient,
                        format!("{caster} casts {} on you.", spell.name),
                    );
                }
            }
            SpellKind::Enchant => {
                let player = self.player_entry(id)?;
                let Some(weapon) = player.equipment.weapon.as_mut() else {
                    self.out.tell(id, "You have no weapon to enchant.");
                    return Ok(());
                };
                if let ItemKind::Weapon { enchantment, .. } = &mut weapon.kind {
                    *enchantment += amount;
                }
                let weapon_name = weapon.name.clone();
                self.spend_cast(id, cost, now)?;
                self.out.tell(id, spell.describe(&weapon_name, amount));
            }
        }
        Ok(())
    }

    fn spend_cast(
        &mut self,
        id: SessionId,
        cost: i32,
        now: Instant,
    ) -> Result<(), WorldError> {
        let player = self.player_entry(id)?;
        player.mana -= cost;
        player.tire(now);
        Ok(())
    }

    /// Applies player-dealt damage: experience for the hit, and the kill
    /// if it drops the monster.
    fn wound_monster(
        &mut self,
        killer: SessionId,
        target: MonsterId,
        damage: i32,
        now: Instant,
    ) -> Result<(), WorldError> {
        let Some(monster) = self.monsters.get_mut(&target) else {
            return Ok(());
        };
        let xp = xp_for_damage(monster.challenge, monster.max_hp, damage);
        monster.hp -= damage;
        let dead = monster.hp < 1;
        self.player_entry(killer)?.xp += xp;
        if !dead {
            return Ok(());
        }

        let Some(mut monster) = self.slay(target, now) else {
            return Ok(());
        };
        let loc = monster.location;
        let loot: Vec<usize> = self
            .catalog
            .room_at(loc)
            .map(|room| room.loot.clone())
            .unwrap_or_default();
        for key in loot {
            let Some(item) = self.catalog.key_item(key) else {
                continue;
            };
            let player = self.player_entry(killer)?;
            if player.has_key(key).is_none() {
                let text = format!(
                    "You found {} {} on the {}.",
                    article(&item.name),
                    item.name,
                    monster.name
                );
                player.inventory.push(item);
                self.out.tell(killer, text);
            }
        }
        if monster.coins > 0 {
            self.player_entry(killer)?.coins += monster.coins;
            self.out.tell(
                killer,
                format!(
                    "You found {} while searching the {}'s corpse.",
                    format_coins(monster.coins),
                    monster.name
                ),
            );
        }
        self.drop_gear(&mut monster);
        Ok(())
    }

    /// Removes a dead monster, announces it, and rearms its lair.
    fn slay(&mut self, target: MonsterId, now: Instant) -> Option<Monster> {
        let monster = self.monsters.remove(&target)?;
        tracing::info!(
            monster = %target,
            name = %monster.name,
            location = %monster.location,
            "monster slain"
        );
        let here = self.ids_at(monster.location, None);
        self.out.tell_each(
            &here,
            &format!("The {} falls to the ground lifeless!", monster.name),
        );
        if let Some(lair) = monster.lair {
            if let Some(timer) = self.lairs.get_mut(&lair) {
                timer.reset(now);
            }
        }
        Some(monster)
    }

    /// Drops a dead monster's equipment while the floor has room.
    fn drop_gear(&mut self, monster: &mut Monster) {
        let loc = monster.location;
        let here = self.ids_at(loc, None);
        let cap = self.rules.max_floor_items;
        for item in monster.equipment.strip() {
            let floor = self.floor_items.entry(loc).or_default();
            if floor.len() >= cap {
                break;
            }
            let text = format!(
                "The {} dropped {} {} on the floor.",
                monster.name,
                article(&item.name),
                item.name
            );
            floor.push(item);
            self.out.tell_each(&here, &text);
        }
    }

    /// Hit points fell below one: wake up at the start with 1 HP.
    pub(crate) fn knock_out(
        &mut self,
        id: SessionId,
        now: Instant,
    ) -> Result<(), WorldError> {
        let start = self.catalog.start;
        let player = self.player_entry(id)?;
        let from = player.location;
        player.hp = 1;
        player.location = start;
        let name = player.name.clone();
        tracing::info!(%id, %name, location = %from, "player knocked out");
        self.out.tell(
            id,
            "As the final blow strikes your body you fall unconscious.",
        );
        self.out
            .tell(id, "You awaken after an unknown amount of time...");
        let witnesses = self.ids_at(from, None);
        self.out
            .tell_each(&witnesses, &format!("{name} collapses and is carried away."));
        self.glance(id, "", now)
    }

    // -- Monster offence --------------------------------------------------

    /// Each monster whose attack timer is ready strikes once: a random
    /// player in its room, or failing that a random monster there whose
    /// name ends differently.
    pub(crate) fn monster_aggression(
        &mut self,
        now: Instant,
    ) -> Result<(), WorldError> {
        let ids: Vec<MonsterId> = self.monsters.keys().copied().collect();
        for mid in ids {
            let Some(monster) = self.monsters.get_mut(&mid) else {
                continue;
            };
            if !monster.attack.try_fire(now) {
                continue;
            }
            let loc = monster.location;
            let kin = last_word(&monster.name).to_string();

            let players = self.ids_at(loc, None);
            if let Some(&target) = players.choose(&mut self.rng) {
                self.monster_hits_player(mid, target, now)?;
                continue;
            }
            let rivals: Vec<MonsterId> = self
                .monsters_at(loc)
                .filter(|m| m.id != mid && last_word(&m.name) != kin)
                .map(|m| m.id)
                .collect();
            if let Some(&victim) = rivals.choose(&mut self.rng) {
                self.monster_hits_monster(mid, victim, now);
            }
        }
        Ok(())
    }

    fn monster_hits_player(
        &mut self,
        attacker: MonsterId,
        target: SessionId,
        now: Instant,
    ) -> Result<(), WorldError> {
        let Some(monster) = self.monsters.get(&attacker) else {
            return Ok(());
        };
        let player = self.players.get_mut(&target).ok_or(WorldError::NoPlayer(target))?;
        let strength = monster.strength_modifier();
        let roll = d20(&mut self.rng) + strength + monster.proficiency;
        let (m_name, weapon) =
            (monster.name.clone(), monster.equipment.weapon_name().to_string());
        let (dice, bonus) = monster.equipment.weapon_damage();
        let loc = player.location;

        if roll <= player.armor_class() {
            let name = player.name.clone();
            self.out.tell(
                target,
                format!("The {m_name}'s poorly executed attack misses you."),
            );
            let others = self.ids_at(loc, Some(target));
            self.out.tell_each(
                &others,
                &format!("The {m_name} attacks {name} and misses."),
            );
            return Ok(());
        }

        let damage = (dice.roll(&mut self.rng) + strength + bonus).max(1);
        player.hp -= damage;
        let down = player.hp < 1;
        let name = player.name.clone();
        self.out.tell(
            target,
            format!(
                "The {m_name} attacked you with their {weapon} for {damage} damage!"
            ),
        );
        let others = self.ids_at(loc, Some(target));
        self.out.tell_each(
            &others,
            &format!("The {m_name} attacked {name} with their {weapon}!"),
        );
        if down {
            self.knock_out(target, now)?;
        }
        Ok(())
    }

    fn monster_hits_monster(
        &mut self,
        attacker: MonsterId,
        victim: MonsterId,
        now: Instant,
    ) {
        let Some(monster) = self.monsters.get(&attacker) else {
            return;
        };
        let strength = monster.strength_modifier();
        let roll = d20(&mut self.rng) + strength + monster.proficiency;
        let a_name = monster.name.clone();
        let weapon = monster.equipment.weapon_name().to_string();
        let (dice, bonus) = monster.equipment.weapon_damage();
        let loc = monster.location;

        let Some(target) = self.monsters.get_mut(&victim) else {
            return;
        };
        if roll <= target.armor_class() {
            return;
        }
        let damage = (dice.roll(&mut self.rng) + strength + bonus).max(1);
        target.hp -= damage;
        let dead = target.hp < 1;
        let v_name = target.name.clone();
        let here = self.ids_at(loc, None);
        self.out.tell_each(
            &here,
            &format!("The {a_name} attacked the {v_name} with their {weapon}!"),
        );
        if !dead {
            return;
        }
        if let Some(mut slain) = self.slay(victim, now) {
            if let Some(winner) = self.monsters.get_mut(&attacker) {
                winner.coins += slain.coins;
            }
            self.drop_gear(&mut slain);
        }
    }

    /// Monsters standing in `loc`, for tests and tooling.
    pub fn monster_ids_at(&self, loc: Location) -> Vec<MonsterId> {
        self.monsters_at(loc).map(|m| m.id).collect()
    }
}

/// Splits `cast` arguments into a known spell and the rest.
///
/// Multi-word spell names are matched as a prefix first; otherwise the
/// first word is matched as a substring of a known spell.
fn resolve_spell<'a>(known: &[String], args: &'a str) -> Option<(String, &'a str)> {
    let lower = args.to_lowercase();
    if let Some(spell) = known
        .iter()
        .find(|s| lower.starts_with(&s.to_lowercase()))
    {
        let rest = args.get(spell.len()..).unwrap_or("").trim();
        return Some((spell.clone(), rest));
    }
    let mut words = args.splitn(2, char::is_whitespace);
    let first = words.next()?;
    let rest = words.next().unwrap_or("").trim();
    known
        .iter()
        .find(|s| name_matches(s, first))
        .map(|s| (s.clone(), rest))
}
