//! Character creation: name, species, class.

use std::time::Instant;

use runemud_protocol::{Command, Recipient, SessionId};

use crate::WorldError;
use crate::player::{Onboarding, Player};
use crate::world::World;

const MAX_NAME_LEN: usize = 16;

impl World {
    /// Handles one line from a session that has no character yet.
    ///
    /// A rejected answer re-asks the same question and returns the
    /// error so the caller can report it.
    pub fn answer_onboarding(
        &mut self,
        id: SessionId,
        command: &Command,
        now: Instant,
    ) -> Result<(), WorldError> {
        let step = self
            .pending
            .get(&id)
            .cloned()
            .ok_or(WorldError::NoPlayer(id))?;

        match step {
            Onboarding::AwaitingName => {
                let name = match self.check_name(&command.verb) {
                    Ok(name) => name,
                    Err(err) => {
                        self.out.tell(id, "What is your name?");
                        return Err(err);
                    }
                };
                self.pending
                    .insert(id, Onboarding::AwaitingSpecies { name });
                let species: Vec<&str> =
                    self.catalog.species.iter().map(|s| s.name.as_str()).collect();
                for line in menu("Species", &species, "What species are you?") {
                    self.out.tell(id, line);
                }
            }
            Onboarding::AwaitingSpecies { name } => {
                let species =
                    match choice(&command.verb, self.catalog.species.len()) {
                        Ok(n) => n,
                        Err(err) => {
                            self.out.tell(id, "What species are you?");
                            return Err(err);
                        }
                    };
                self.pending
                    .insert(id, Onboarding::AwaitingClass { name, species });
                let classes: Vec<&str> =
                    self.catalog.classes.iter().map(|c| c.name.as_str()).collect();
                for line in menu("Class", &classes, "What class are you?") {
                    self.out.tell(id, line);
                }
            }
            Onboarding::AwaitingClass { name, species } => {
                let class =
                    match choice(&command.verb, self.catalog.classes.len()) {
                        Ok(n) => n,
                        Err(err) => {
                            self.out.tell(id, "What class are you?");
                            return Err(err);
                        }
                    };
                self.enter_game(id, name, species, class, now)?;
            }
        }
        Ok(())
    }

    fn enter_game(
        &mut self,
        id: SessionId,
        name: String,
        species: usize,
        class: usize,
        now: Instant,
    ) -> Result<(), WorldError> {
        let player = Player::create(
            id,
            name.clone(),
            species,
            class,
            &self.catalog,
            self.rules.action_interval,
            now,
            &mut self.rng,
        );
        tracing::info!(
            %id,
            %name,
            species = %self.catalog.species[species].name,
            class = %self.catalog.classes[class].name,
            "player entered the game"
        );
        self.pending.remove(&id);
        self.players.insert(id, player);

        self.out
            .broadcast(Recipient::AllExcept(id), format!("{name} entered the game"));
        self.out.tell(id, format!("Welcome to the game, {name}."));
        self.glance(id, "", now)
    }

    /// Capitalizes the first word typed and checks it can be used.
    fn check_name(&self, word: &str) -> Result<String, WorldError> {
        if word.is_empty() {
            return Err(WorldError::InvalidName(
                "Please tell me your name.".into(),
            ));
        }
        if !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(WorldError::InvalidName(
                "Names may only contain letters.".into(),
            ));
        }
        if word.len() > MAX_NAME_LEN {
            return Err(WorldError::InvalidName(format!(
                "Names may be at most {MAX_NAME_LEN} letters long."
            )));
        }
        let name = capitalize(word);
        let claimed = self.pending.values().any(|step| match step {
            Onboarding::AwaitingSpecies { name: held }
            | Onboarding::AwaitingClass { name: held, .. } => *held == name,
            Onboarding::AwaitingName => false,
        });
        if claimed || self.players.values().any(|p| p.name == name) {
            return Err(WorldError::InvalidName(
                "That name is already taken.".into(),
            ));
        }
        Ok(name)
    }
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parses a menu answer in `0..len`.
fn choice(answer: &str, len: usize) -> Result<usize, WorldError> {
    answer
        .parse::<usize>()
        .ok()
        .filter(|&n| n < len)
        .ok_or_else(|| WorldError::InvalidChoice(answer.to_string()))
}

/// A numbered two-column table followed by a question.
fn menu(title: &str, names: &[&str], question: &str) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "+==========+============+".to_string(),
        format!("| Num      | {title:<11}|"),
        "+----------+------------+".to_string(),
    ];
    for (num, name) in names.iter().enumerate() {
        lines.push(format!("| {num:<9}| {name:<11}|"));
    }
    lines.push("+==========+============+".to_string());
    lines.push(String::new());
    lines.push(question.to_string());
    lines
}
