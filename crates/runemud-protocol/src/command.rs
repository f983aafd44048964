//! Player input split into a verb and its arguments.

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    /// First whitespace-delimited token, lower-cased. Empty for a blank line.
    pub verb: String,
    /// Everything after the verb, without leading whitespace.
    pub args: String,
}

impl Command {
    /// Parses a completed line.
    ///
    /// Surrounding whitespace (including a trailing `\r`) is trimmed first.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            Some((verb, args)) => Self {
                verb: verb.to_lowercase(),
                args: args.trim_start().to_string(),
            },
            None => Self {
                verb: line.to_lowercase(),
                args: String::new(),
            },
        }
    }

    /// Builds a command from parts, for tests and scripted input.
    pub fn new(verb: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            args: args.into(),
        }
    }

    /// `true` for a blank line.
    pub fn is_empty(&self) -> bool {
        self.verb.is_empty()
    }

    /// The arguments split on whitespace.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.args.split_whitespace()
    }
}
