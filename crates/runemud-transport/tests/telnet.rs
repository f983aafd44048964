//! Exercises the TCP transport against real loopback sockets.

use std::time::Duration;

use runemud_transport::{
    Connection, Listener, RecvOutcome, TelnetConnection, TelnetListener,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Polls `try_accept` until a connection shows up, yielding to the reactor
/// between attempts.
async fn accept_eventually(listener: &mut TelnetListener) -> TelnetConnection {
    for _ in 0..200 {
        if let Some((conn, _)) = listener.try_accept().unwrap() {
            return conn;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("no connection accepted");
}

async fn recv_eventually(conn: &mut TelnetConnection) -> RecvOutcome {
    let mut buf = [0u8; 64];
    for _ in 0..200 {
        match conn.try_recv(&mut buf).unwrap() {
            RecvOutcome::Pending => {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            other => return other,
        }
    }
    panic!("nothing received");
}

#[tokio::test]
async fn test_try_accept_without_client_returns_none() {
    let mut listener = TelnetListener::bind("127.0.0.1:0").await.unwrap();
    assert!(listener.try_accept().unwrap().is_none());
}

#[tokio::test]
async fn test_try_recv_reads_client_bytes() {
    let mut listener = TelnetListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut client = TcpStream::connect(addr).await.unwrap();
    let mut conn = accept_eventually(&mut listener).await;

    client.write_all(b"look\r\n").await.unwrap();
    assert_eq!(recv_eventually(&mut conn).await, RecvOutcome::Data(6));
}

#[tokio::test]
async fn test_try_recv_after_client_close_returns_closed() {
    let mut listener = TelnetListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let mut conn = accept_eventually(&mut listener).await;

    drop(client);
    assert_eq!(recv_eventually(&mut conn).await, RecvOutcome::Closed);
}

#[tokio::test]
async fn test_try_send_reaches_client() {
    let mut listener = TelnetListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut client = TcpStream::connect(addr).await.unwrap();
    let mut conn = accept_eventually(&mut listener).await;

    let payload = b"Welcome\n\r";
    let mut sent = 0;
    for _ in 0..200 {
        sent += conn.try_send(&payload[sent..]).unwrap();
        if sent == payload.len() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(sent, payload.len());

    let mut buf = vec![0u8; payload.len()];
    client.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, payload);
}

#[tokio::test]
async fn test_probe_healthy_connection_returns_ok() {
    let mut listener = TelnetListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _client = TcpStream::connect(addr).await.unwrap();
    let mut conn = accept_eventually(&mut listener).await;

    assert!(conn.probe().is_ok());
}

#[tokio::test]
async fn test_close_client_reads_end_of_stream() {
    let mut listener = TelnetListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut client = TcpStream::connect(addr).await.unwrap();
    let conn = accept_eventually(&mut listener).await;

    conn.close();
    let mut buf = [0u8; 8];
    let n = tokio::time::timeout(Duration::from_secs(2), client.read(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_bind_invalid_address_returns_bind_failed() {
    let result = TelnetListener::bind("not-an-address").await;
    assert!(matches!(
        result,
        Err(runemud_transport::TransportError::BindFailed { .. })
    ));
}
