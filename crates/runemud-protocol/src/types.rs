//! Addressing types shared by the game loop and the session registry.

use runemud_transport::SessionId;

/// Specifies which sessions should receive a line of text.
///
/// Game logic returns `(Recipient, text)` pairs; the game loop resolves each
/// recipient against the sessions that are currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// One specific session.
    Session(SessionId),

    /// Every open session except the given one.
    AllExcept(SessionId),

    /// Every open session.
    All,
}

impl Recipient {
    /// Whether a session with the given id is addressed.
    pub fn includes(&self, id: SessionId) -> bool {
        match self {
            Self::Session(target) => *target == id,
            Self::AllExcept(excluded) => *excluded != id,
            Self::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_session_includes_only_target() {
        let r = Recipient::Session(SessionId::new(1));
        assert!(r.includes(SessionId::new(1)));
        assert!(!r.includes(SessionId::new(2)));
    }

    #[test]
    fn test_recipient_all_except_excludes_one() {
        let r = Recipient::AllExcept(SessionId::new(1));
        assert!(!r.includes(SessionId::new(1)));
        assert!(r.includes(SessionId::new(2)));
    }

    #[test]
    fn test_recipient_all_includes_everyone() {
        assert!(Recipient::All.includes(SessionId::new(99)));
    }
}
