//! The verb table: which world handler answers which command.

use std::time::Instant;

use runemud_protocol::SessionId;
use runemud_world::{World, WorldError};

/// A command handler. Receives the argument text after the verb.
pub type Handler =
    fn(&mut World, SessionId, &str, Instant) -> Result<(), WorldError>;

/// Looks up the handler for a verb.
///
/// `None` means the line is not a command; the caller treats it as
/// speech.
pub fn lookup(verb: &str) -> Option<Handler> {
    let handler: Handler = match verb {
        "" => World::glance,
        "look" | "l" => World::look,
        "go" => World::go,
        "north" | "n" => |w, id, _, now| w.go(id, "north", now),
        "south" | "s" => |w, id, _, now| w.go(id, "south", now),
        "east" | "e" => |w, id, _, now| w.go(id, "east", now),
        "west" | "w" => |w, id, _, now| w.go(id, "west", now),
        "up" | "u" => |w, id, _, now| w.go(id, "up", now),
        "down" | "d" => |w, id, _, now| w.go(id, "down", now),
        "attack" | "a" => World::attack,
        "cast" => World::cast,
        "experience" | "xp" => World::experience,
        "stats" | "st" => World::stats,
        "health" | "hp" => World::health,
        "inventory" | "inv" | "i" => World::inventory,
        "equip" => World::equip,
        "unequip" => World::unequip,
        "get" => World::pick_up,
        "drop" => World::drop_item,
        "list" => World::list,
        "buy" => World::buy,
        "sell" => World::sell,
        "learn" => World::learn,
        "ring" => World::ring_gong,
        "who" => World::who,
        "say" => World::say,
        "help" => World::help,
        "quit" => World::quit,
        _ => return None,
    };
    Some(handler)
}

/// Runs one line of input from a player who has finished character
/// creation.
pub fn dispatch(
    world: &mut World,
    id: SessionId,
    verb: &str,
    args: &str,
    now: Instant,
) -> Result<(), WorldError> {
    match lookup(verb) {
        Some(handler) => handler(world, id, args, now),
        None => world.speak(id, verb, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_aliases_are_known() {
        for verb in ["l", "n", "s", "e", "w", "u", "d", "a", "xp", "st", "hp", "i"] {
            assert!(lookup(verb).is_some(), "{verb}");
        }
    }

    #[test]
    fn test_lookup_blank_line_is_known() {
        assert!(lookup("").is_some());
    }

    #[test]
    fn test_dispatch_shop_verbs_reach_the_world() {
        use runemud_protocol::{Command, Recipient};
        use runemud_world::{Catalog, Outbound, RulesConfig};

        let mut world =
            World::with_seed(Catalog::builtin().unwrap(), RulesConfig::default(), 2);
        let now = Instant::now();
        let id = SessionId::new(1);
        world.session_opened(id);
        for answer in ["aria", "0", "0"] {
            world
                .answer_onboarding(id, &Command::parse(answer), now)
                .unwrap();
        }
        world.take_outbound();

        for (line, reply) in [
            ("list", "There is nothing for sale here."),
            ("buy dagger", "There is nothing for sale here."),
            ("sell torch", "Sorry, you can't do that here."),
            ("learn magic missile", "Sorry, you can't do that here."),
            ("ring bell", "Ring what?"),
        ] {
            let command = Command::parse(line);
            dispatch(&mut world, id, &command.verb, &command.args, now).unwrap();
            let said: Vec<String> = world
                .take_outbound()
                .into_iter()
                .filter_map(|o| match o {
                    Outbound::Message {
                        to: Recipient::Session(to),
                        text,
                    } if to == id => Some(text),
                    _ => None,
                })
                .collect();
            assert_eq!(said, [reply], "{line}");
        }
    }

    #[test]
    fn test_lookup_unknown_verb_is_none() {
        assert!(lookup("hello").is_none());
        assert!(lookup("LOOK").is_none());
    }
}
