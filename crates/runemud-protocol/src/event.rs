//! Events produced by one polling pass and the double buffer that carries
//! them to the game loop.

use std::collections::HashSet;

use runemud_transport::SessionId;

use crate::Command;

/// A discrete occurrence on the network side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A client connected and was given `id`.
    NewSession { id: SessionId },
    /// The session is gone, whether the client left or the socket failed.
    SessionEnded { id: SessionId },
    /// The session sent a complete line.
    CommandReceived { id: SessionId, command: Command },
}

impl Event {
    /// The session this event concerns.
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::NewSession { id }
            | Self::SessionEnded { id }
            | Self::CommandReceived { id, .. } => *id,
        }
    }
}

/// Accumulates events during a polling pass and hands them over in one
/// batch.
///
/// The producer pushes while polling; the game loop calls [`swap`] once per
/// tick and gets everything pushed since the previous swap, in push order.
/// After a session's `SessionEnded`, further events for that id in the same
/// batch are dropped, so `SessionEnded` is always the last event for its id.
///
/// [`swap`]: EventLog::swap
#[derive(Debug, Default)]
pub struct EventLog {
    current: Vec<Event>,
    ended: HashSet<SessionId>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to the batch being accumulated.
    pub fn push(&mut self, event: Event) {
        let id = event.session_id();
        if self.ended.contains(&id) {
            tracing::warn!(
                %id,
                ?event,
                "event after session end, dropping"
            );
            return;
        }
        if matches!(event, Event::SessionEnded { .. }) {
            self.ended.insert(id);
        }
        self.current.push(event);
    }

    /// Returns the accumulated batch and starts a fresh, empty one.
    pub fn swap(&mut self) -> Vec<Event> {
        self.ended.clear();
        let capacity = self.current.capacity();
        std::mem::replace(&mut self.current, Vec::with_capacity(capacity))
    }

    /// Number of events waiting for the next swap.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> SessionId {
        SessionId::new(n)
    }

    fn command(n: u64, line: &str) -> Event {
        Event::CommandReceived {
            id: id(n),
            command: Command::parse(line),
        }
    }

    #[test]
    fn test_swap_returns_events_in_push_order() {
        let mut log = EventLog::new();
        log.push(Event::NewSession { id: id(1) });
        log.push(command(1, "look"));
        log.push(Event::NewSession { id: id(2) });

        let batch = log.swap();
        assert_eq!(
            batch,
            vec![
                Event::NewSession { id: id(1) },
                command(1, "look"),
                Event::NewSession { id: id(2) },
            ]
        );
    }

    #[test]
    fn test_swap_twice_second_batch_is_empty() {
        let mut log = EventLog::new();
        log.push(Event::NewSession { id: id(1) });
        assert_eq!(log.swap().len(), 1);
        assert!(log.swap().is_empty());
    }

    #[test]
    fn test_swap_resets_accumulator() {
        let mut log = EventLog::new();
        log.push(command(1, "n"));
        let _ = log.swap();
        assert!(log.is_empty());
        log.push(command(1, "s"));
        assert_eq!(log.swap(), vec![command(1, "s")]);
    }

    #[test]
    fn test_push_after_session_ended_is_dropped() {
        let mut log = EventLog::new();
        log.push(command(3, "say bye"));
        log.push(Event::SessionEnded { id: id(3) });
        log.push(command(3, "look"));
        log.push(command(4, "look"));

        let batch = log.swap();
        assert_eq!(
            batch,
            vec![
                command(3, "say bye"),
                Event::SessionEnded { id: id(3) },
                command(4, "look"),
            ]
        );
    }

    #[test]
    fn test_ended_marker_does_not_leak_into_next_batch() {
        let mut log = EventLog::new();
        log.push(Event::SessionEnded { id: id(5) });
        let _ = log.swap();
        log.push(command(5, "look"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_event_session_id() {
        assert_eq!(command(9, "x").session_id(), id(9));
        assert_eq!(Event::SessionEnded { id: id(2) }.session_id(), id(2));
    }
}
