//! Integration tests for the client session: handshake, identification,
//! acknowledgement dispatch and level replacement.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use philipont::prelude::*;
use tokio_tungstenite::tungstenite::Message;

const HASH: &[u8; 32] = b"01234567890123456789012345678901";

// =========================================================================
// Test doubles
// =========================================================================

/// Replays a fixed list of inbound messages and records everything sent.
#[derive(Default)]
struct ScriptedConnection {
    inbound: Mutex<VecDeque<Vec<u8>>>,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedConnection {
    fn with_inbound(messages: Vec<Vec<u8>>) -> Self {
        Self {
            inbound: Mutex::new(messages.into()),
            sent: Mutex::default(),
        }
    }

    fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

impl Connection for ScriptedConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.inbound.lock().unwrap().pop_front())
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        ConnectionId::new(99)
    }
}

/// Records scene calls in order.
#[derive(Default)]
struct RecordingScene {
    events: Vec<String>,
}

impl Scene for RecordingScene {
    fn destroy_buffers(&mut self) {
        self.events.push("destroy".into());
    }

    fn init_buffers(&mut self, level: &Level) {
        self.events.push(format!("init:{}", level.name));
    }
}

/// A complete `ACK_NEW_LEVEL` message for a 1×1 terrain with no road and
/// an empty structure graph.
fn level_message(lid: u32, name: &str) -> Vec<u8> {
    let mut m = vec![0xF0];
    m.extend_from_slice(&lid.to_le_bytes());
    m.extend_from_slice(&12u32.to_le_bytes());
    m.push(name.len() as u8);
    m.extend_from_slice(name.as_bytes());
    m.push(4);
    m.extend_from_slice(b"Phil");
    m.extend_from_slice(&[b'k'; 32]);
    for v in [0.0f64, 0.0, 0.0, 1.0] {
        m.extend_from_slice(&v.to_le_bytes()); // water, size x, size z, res
    }
    for v in [0.0f64; 3] {
        m.extend_from_slice(&v.to_le_bytes()); // single heightmap sample
    }
    m.extend_from_slice(&0u32.to_le_bytes()); // road segments
    m.extend_from_slice(&0u32.to_le_bytes()); // skin
    for v in [1.0f64, 0.5, 0.0, 0.0, 0.0, 0.0, -9.81, 0.0] {
        m.extend_from_slice(&v.to_le_bytes()); // density, humidity, wind, gravity
    }
    m.extend_from_slice(&0u16.to_le_bytes()); // nodes
    m.extend_from_slice(&0u16.to_le_bytes()); // links
    m
}

fn auto_level() -> NewLevelParams {
    NewLevelParams {
        name: "WOOHOO!".into(),
        designer: "Phil za best".into(),
        terrain_x: 10.0,
        terrain_z: 10.0,
        terrain_res: 0.5,
    }
}

// =========================================================================
// Session flow over a scripted connection
// =========================================================================

#[tokio::test]
async fn test_run_sends_handshake_then_identify() {
    let conn = ScriptedConnection::default();
    let config = ClientConfig::builder().credentials("12", *HASH).build();
    let mut client = Client::new(conn, RecordingScene::default(), config);

    client.run().await.unwrap();

    let sent = client.connection().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], vec![0x02]);
    assert_eq!(sent[1][0], 0x0F);
    assert_eq!(sent[1].len(), 65);
}

#[tokio::test]
async fn test_ident_ack_triggers_auto_level_request() {
    let conn = ScriptedConnection::with_inbound(vec![vec![0xFF]]);
    let config = ClientConfig::builder()
        .credentials("12", *HASH)
        .auto_level(auto_level())
        .build();
    let mut client = Client::new(conn, RecordingScene::default(), config);

    client.run().await.unwrap();

    let sent = client.connection().sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2][0], 0x00, "third message should be CMD_NEW_LEVEL");
}

#[tokio::test]
async fn test_ident_ack_without_auto_level_sends_nothing_more() {
    let conn = ScriptedConnection::default();
    let mut client = Client::new(conn, RecordingScene::default(), ClientConfig::default());

    let handled = client.handle_message(&[0xFF]).await.unwrap();
    assert_eq!(handled, Some(Opcode::AckIdent));
    assert!(client.connection().sent().is_empty());
}

#[tokio::test]
async fn test_new_level_ack_installs_level_through_scene() {
    let conn = ScriptedConnection::with_inbound(vec![level_message(1, "first")]);
    let mut client = Client::new(conn, RecordingScene::default(), ClientConfig::default());

    client.run().await.unwrap();

    let level = client.level().expect("level should be installed");
    assert_eq!(level.lid, 1);
    assert_eq!(level.name, "first");
    assert_eq!(client.scene().events, vec!["destroy", "init:first"]);
}

#[tokio::test]
async fn test_second_level_replaces_first() {
    let conn = ScriptedConnection::with_inbound(vec![
        level_message(1, "first"),
        level_message(2, "second"),
    ]);
    let mut client = Client::new(conn, RecordingScene::default(), ClientConfig::default());

    client.run().await.unwrap();

    assert_eq!(client.level().unwrap().lid, 2);
    assert_eq!(
        client.scene().events,
        vec!["destroy", "init:first", "destroy", "init:second"]
    );
}

// =========================================================================
// Error recovery
// =========================================================================

#[tokio::test]
async fn test_malformed_message_is_discarded_and_level_kept() {
    let mut truncated = level_message(2, "broken");
    truncated.truncate(40);

    let conn = ScriptedConnection::with_inbound(vec![
        level_message(1, "good"),
        truncated,
        level_message(3, "after"),
    ]);
    let mut client = Client::new(conn, RecordingScene::default(), ClientConfig::default());

    let first = client.connection().inbound.lock().unwrap().pop_front().unwrap();
    client.handle_message(&first).await.unwrap();

    let bad = client.connection().inbound.lock().unwrap().pop_front().unwrap();
    let handled = client.handle_message(&bad).await.unwrap();
    assert_eq!(handled, None);
    assert_eq!(client.level().unwrap().name, "good");
    assert_eq!(client.scene().events, vec!["destroy", "init:good"]);

    // The next message decodes normally.
    client.run().await.unwrap();
    assert_eq!(client.level().unwrap().name, "after");
}

#[tokio::test]
async fn test_invalid_auto_level_keeps_session_alive() {
    let params = NewLevelParams {
        name: "n".repeat(300),
        ..auto_level()
    };
    let conn = ScriptedConnection::with_inbound(vec![
        vec![0xFF],
        vec![0x7E],
        level_message(4, "later"),
    ]);
    let config = ClientConfig::builder()
        .credentials("12", *HASH)
        .auto_level(params)
        .build();
    let mut client = Client::new(conn, RecordingScene::default(), config);

    client.run().await.expect("invalid request is not fatal");

    // Handshake and ident only; the oversized level request never went out.
    assert_eq!(client.connection().sent().len(), 2);
    assert!(client.connection().inbound.lock().unwrap().is_empty());
    assert_eq!(client.level().unwrap().name, "later");
}

#[tokio::test]
async fn test_unknown_opcode_is_ignored() {
    let conn = ScriptedConnection::default();
    let mut client = Client::new(conn, RecordingScene::default(), ClientConfig::default());

    assert_eq!(client.handle_message(&[0x7E, 1, 2]).await.unwrap(), None);
    assert!(client.level().is_none());
    assert!(client.scene().events.is_empty());
}

#[tokio::test]
async fn test_invalid_credentials_abort_before_sending_ident() {
    let conn = ScriptedConnection::default();
    let config = ClientConfig::builder().credentials("12", vec![1u8; 31]).build();
    let mut client = Client::new(conn, RecordingScene::default(), config);

    let err = client.run().await.unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)));
    // Only the handshake went out.
    assert_eq!(client.connection().sent(), vec![vec![0x02]]);
}

#[tokio::test]
async fn test_swap_level_returns_previous() {
    let conn = ScriptedConnection::default();
    let mut client = Client::new(conn, RecordingScene::default(), ClientConfig::default());

    let first = match Ack::decode(&level_message(1, "a")).unwrap() {
        Some(Ack::NewLevel(level)) => *level,
        other => panic!("unexpected {other:?}"),
    };
    let second = Level { lid: 2, ..first.clone() };

    assert!(client.swap_level(first).is_none());
    let previous = client.swap_level(second).expect("previous level");
    assert_eq!(previous.lid, 1);
    assert_eq!(client.level().unwrap().lid, 2);

    let (scene, level) = client.close().await.unwrap();
    assert_eq!(scene.events.len(), 4);
    assert_eq!(level.unwrap().lid, 2);
}

// =========================================================================
// End to end over a real WebSocket
// =========================================================================

#[tokio::test]
async fn test_websocket_session_end_to_end() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // A scripted server: expects magic byte, ident and new level, then
    // answers with the matching acknowledgements and closes.
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let magic = ws.next().await.unwrap().unwrap().into_data().to_vec();
        let ident = ws.next().await.unwrap().unwrap().into_data().to_vec();

        ws.send(Message::Binary(vec![0xFF].into())).await.unwrap();
        let new_level = ws.next().await.unwrap().unwrap().into_data().to_vec();
        ws.send(Message::Binary(level_message(5, "WOOHOO!").into()))
            .await
            .unwrap();
        ws.send(Message::Close(None)).await.unwrap();
        (magic, ident, new_level)
    });

    let config = ClientConfig::builder()
        .url(&format!("ws://{addr}"))
        .credentials("12", *HASH)
        .recv_timeout(Some(Duration::from_secs(5)))
        .auto_level(auto_level())
        .build();
    let mut client = Client::connect(config, RecordingScene::default())
        .await
        .expect("client should connect");
    client.run().await.expect("session should end cleanly");

    let (magic, ident, new_level) = server.await.unwrap();
    assert_eq!(magic, vec![0x02]);
    assert_eq!(ident[0], 0x0F);
    assert_eq!(new_level[0], 0x00);

    let level = client.level().expect("level installed");
    assert_eq!(level.lid, 5);
    assert_eq!(level.name, "WOOHOO!");
}
