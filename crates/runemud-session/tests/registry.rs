//! Connection registry behavior against the in-memory transport.

use std::io;
use std::time::{Duration, Instant};

use runemud_protocol::{Command, Event};
use runemud_session::{ConnectionRegistry, SessionConfig, SessionError, SessionId};
use runemud_transport::{MemoryClient, MemoryConnector, MemoryListener};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn registry() -> (ConnectionRegistry<MemoryListener>, MemoryConnector) {
    registry_with(SessionConfig::default())
}

fn registry_with(
    config: SessionConfig,
) -> (ConnectionRegistry<MemoryListener>, MemoryConnector) {
    let listener = MemoryListener::new();
    let connector = listener.connector();
    (ConnectionRegistry::new(listener, config), connector)
}

fn sid(n: u64) -> SessionId {
    SessionId::new(n)
}

fn cmd(n: u64, verb: &str, args: &str) -> Event {
    Event::CommandReceived {
        id: sid(n),
        command: Command::new(verb, args),
    }
}

fn ended_count(events: &[Event], id: SessionId) -> usize {
    events
        .iter()
        .filter(|e| **e == Event::SessionEnded { id })
        .count()
}

/// Connects one client and swaps away its `NewSession` event.
fn connect(
    registry: &mut ConnectionRegistry<MemoryListener>,
    connector: &MemoryConnector,
) -> MemoryClient {
    let client = connector.connect();
    registry.poll(Instant::now());
    let _ = registry.swap_events();
    client
}

// ---------------------------------------------------------------------------
// Accepting
// ---------------------------------------------------------------------------

#[test]
fn test_accept_new_assigns_increasing_ids() {
    let (mut reg, connector) = registry();
    let _a = connector.connect();
    let _b = connector.connect();

    assert_eq!(reg.accept_new(Instant::now()), 2);
    assert_eq!(
        reg.swap_events(),
        vec![
            Event::NewSession { id: sid(1) },
            Event::NewSession { id: sid(2) },
        ]
    );
    assert_eq!(reg.session_ids(), vec![sid(1), sid(2)]);
}

#[test]
fn test_accept_new_nothing_pending_returns_zero() {
    let (mut reg, _connector) = registry();
    assert_eq!(reg.accept_new(Instant::now()), 0);
    assert!(reg.swap_events().is_empty());
}

#[test]
fn test_accept_new_ids_never_reused_after_disconnect() {
    let (mut reg, connector) = registry();
    let _a = connect(&mut reg, &connector);
    reg.disconnect(sid(1)).unwrap();
    let _ = reg.swap_events();

    let _b = connect(&mut reg, &connector);
    assert_eq!(reg.session_ids(), vec![sid(2)]);
}

#[test]
fn test_accept_new_records_peer_address() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);
    assert_eq!(reg.peer_addr(sid(1)), Some(client.addr()));
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[test]
fn test_poll_new_session_precedes_its_commands() {
    let (mut reg, connector) = registry();
    let client = connector.connect();
    client.send(b"Aria\r\nlook\r\n");

    reg.poll(Instant::now());
    assert_eq!(
        reg.swap_events(),
        vec![
            Event::NewSession { id: sid(1) },
            cmd(1, "aria", ""),
            cmd(1, "look", ""),
        ]
    );
}

#[test]
fn test_poll_readable_partial_line_waits_for_newline() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    client.send(b"say hel");
    reg.poll_readable();
    assert!(reg.swap_events().is_empty());

    client.send(b"lo\n");
    reg.poll_readable();
    assert_eq!(reg.swap_events(), vec![cmd(1, "say", "hello")]);
}

#[test]
fn test_poll_readable_reads_one_chunk_per_poll() {
    let config = SessionConfig {
        read_chunk_size: 4,
        ..SessionConfig::default()
    };
    let (mut reg, connector) = registry_with(config);
    let client = connect(&mut reg, &connector);

    client.send(b"n\nsouth\n");
    reg.poll_readable();
    assert_eq!(reg.swap_events(), vec![cmd(1, "n", "")]);
    reg.poll_readable();
    reg.poll_readable();
    assert_eq!(reg.swap_events(), vec![cmd(1, "south", "")]);
}

#[test]
fn test_poll_readable_strips_telnet_negotiation() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    client.send(&[255, 253, 1, b'w', b'h', b'o', 255, 246, b'\r', b'\n']);
    reg.poll_readable();
    assert_eq!(reg.swap_events(), vec![cmd(1, "who", "")]);
}

#[test]
fn test_poll_hang_up_produces_single_session_ended() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    client.hang_up();
    reg.poll(Instant::now());
    let events = reg.swap_events();
    assert_eq!(events, vec![Event::SessionEnded { id: sid(1) }]);
    assert!(!reg.contains(sid(1)));
    assert!(client.is_closed_by_server());

    reg.poll(Instant::now());
    assert!(reg.swap_events().is_empty());
}

#[test]
fn test_poll_connection_reset_ends_only_that_session() {
    let (mut reg, connector) = registry();
    let a = connect(&mut reg, &connector);
    let b = connect(&mut reg, &connector);

    a.fail_next_read(io::ErrorKind::ConnectionReset);
    b.send(b"look\n");
    reg.poll(Instant::now());

    let events = reg.swap_events();
    assert_eq!(ended_count(&events, sid(1)), 1);
    assert!(events.contains(&cmd(2, "look", "")));
    assert_eq!(reg.session_ids(), vec![sid(2)]);

    b.send(b"n\n");
    reg.poll(Instant::now());
    assert_eq!(reg.swap_events(), vec![cmd(2, "n", "")]);
}

#[test]
fn test_poll_data_then_hang_up_delivers_commands_before_end() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    client.send(b"quit\n");
    client.hang_up();
    reg.poll(Instant::now());
    reg.poll(Instant::now());

    assert_eq!(
        reg.swap_events(),
        vec![cmd(1, "quit", ""), Event::SessionEnded { id: sid(1) }]
    );
}

// ---------------------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------------------

#[test]
fn test_probe_liveness_updates_last_check() {
    let (mut reg, connector) = registry();
    let _client = connect(&mut reg, &connector);
    let later = Instant::now() + Duration::from_secs(5);

    reg.probe_liveness(later);
    let session = reg.get(sid(1)).unwrap();
    assert_eq!(session.last_liveness_check(), later);
}

#[test]
fn test_probe_liveness_socket_error_ends_session() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    client.set_socket_error(io::ErrorKind::ConnectionReset);
    reg.probe_liveness(Instant::now());
    assert_eq!(reg.swap_events(), vec![Event::SessionEnded { id: sid(1) }]);
    assert!(reg.is_empty());
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

#[test]
fn test_send_appends_line_terminator() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    reg.send(sid(1), "What is your name?").unwrap();
    assert_eq!(client.take_text(), "What is your name?\n\r");
}

#[test]
fn test_send_unknown_session_returns_not_found() {
    let (mut reg, _connector) = registry();
    let err = reg.send(sid(7), "hello").unwrap_err();
    assert!(matches!(err, SessionError::NotFound(id) if id == sid(7)));
}

#[test]
fn test_send_write_failure_raises_session_ended_later() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    client.fail_next_write(io::ErrorKind::BrokenPipe);
    assert!(reg.send(sid(1), "hello").is_ok());
    assert!(!reg.contains(sid(1)));
    assert_eq!(reg.swap_events(), vec![Event::SessionEnded { id: sid(1) }]);
}

#[test]
fn test_send_partial_write_remainder_flushed_on_probe() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    client.limit_writes(Some(0));
    reg.send(sid(1), "You see a torch.").unwrap();
    assert!(client.take_output().is_empty());
    assert_eq!(reg.get(sid(1)).unwrap().pending_output(), 18);

    client.limit_writes(None);
    reg.probe_liveness(Instant::now());
    assert_eq!(client.take_text(), "You see a torch.\n\r");
    assert_eq!(reg.get(sid(1)).unwrap().pending_output(), 0);
}

#[test]
fn test_send_backlog_over_limit_ends_session() {
    let config = SessionConfig {
        max_pending_output: 8,
        ..SessionConfig::default()
    };
    let (mut reg, connector) = registry_with(config);
    let client = connect(&mut reg, &connector);

    client.limit_writes(Some(0));
    reg.send(sid(1), "0123456789").unwrap();
    assert!(!reg.contains(sid(1)));
    assert_eq!(reg.swap_events(), vec![Event::SessionEnded { id: sid(1) }]);
}

#[test]
fn test_flush_all_delivers_queued_output() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    client.limit_writes(Some(3));
    reg.send(sid(1), "Goodbye").unwrap();
    reg.flush_all();
    reg.flush_all();
    reg.flush_all();
    assert_eq!(client.take_text(), "Goodbye\n\r");
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

#[test]
fn test_disconnect_closes_and_reports_session_ended() {
    let (mut reg, connector) = registry();
    let client = connect(&mut reg, &connector);

    reg.send(sid(1), "Goodbye, Aria.").unwrap();
    reg.disconnect(sid(1)).unwrap();

    assert_eq!(client.take_text(), "Goodbye, Aria.\n\r");
    assert!(client.is_closed_by_server());
    assert_eq!(reg.swap_events(), vec![Event::SessionEnded { id: sid(1) }]);
}

#[test]
fn test_disconnect_twice_returns_not_found() {
    let (mut reg, connector) = registry();
    let _client = connect(&mut reg, &connector);

    reg.disconnect(sid(1)).unwrap();
    assert!(matches!(
        reg.disconnect(sid(1)),
        Err(SessionError::NotFound(_))
    ));
}

#[test]
fn test_shutdown_closes_every_session() {
    let (mut reg, connector) = registry();
    let a = connect(&mut reg, &connector);
    let b = connect(&mut reg, &connector);

    reg.shutdown();
    assert!(reg.is_empty());
    assert!(a.is_closed_by_server());
    assert!(b.is_closed_by_server());
}

#[test]
fn test_local_addr_comes_from_listener() {
    let (reg, _connector) = registry();
    assert_eq!(reg.local_addr().unwrap().port(), 4000);
}
