//! Client session: handshake, identification and level ownership.
//!
//! A [`Client`] owns one connection and at most one active [`Level`]. The
//! flow mirrors the server's expectations:
//!   1. Send the one-byte handshake frame
//!   2. Send `CMD_IDENT` (if credentials are configured)
//!   3. Loop: receive acknowledgements → decode → update the scene
//!
//! Decoding is strictly one message at a time. A message that fails to
//! decode is logged and dropped; it never touches the installed level.

use philipont_protocol::{
    handshake_frame, identify, Ack, Level, NewLevelParams, Opcode,
};
use philipont_transport::{Connection, TransportError, WebSocketConnection};

use crate::{ClientConfig, ClientError, Scene};

/// A session with the simulation server.
pub struct Client<C, S> {
    conn: C,
    scene: S,
    config: ClientConfig,
    level: Option<Level>,
}

impl<S: Scene> Client<WebSocketConnection, S> {
    /// Opens a WebSocket connection to `config.url`.
    ///
    /// The handshake is not sent yet; [`run`](Client::run) or
    /// [`open`](Client::open) does that.
    pub async fn connect(config: ClientConfig, scene: S) -> Result<Self, ClientError> {
        let conn = WebSocketConnection::connect(&config.url).await?;
        Ok(Self::new(conn, scene, config))
    }
}

impl<C, S> Client<C, S>
where
    C: Connection<Error = TransportError>,
    S: Scene,
{
    /// Wraps an already open connection.
    pub fn new(conn: C, scene: S, config: ClientConfig) -> Self {
        Self {
            conn,
            scene,
            config,
            level: None,
        }
    }

    /// The currently installed level, if any.
    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends the handshake frame that announces a Philipont client.
    pub async fn open(&self) -> Result<(), ClientError> {
        tracing::debug!(conn_id = %self.conn.id(), "sending handshake");
        self.conn.send(&handshake_frame()).await?;
        Ok(())
    }

    /// Sends `CMD_IDENT`. Invalid input is rejected before anything is sent.
    pub async fn identify(&self, user_id: &str, passhash: &[u8]) -> Result<(), ClientError> {
        let request = identify(user_id, passhash)?;
        request.send(&self.conn).await?;
        tracing::info!(conn_id = %self.conn.id(), user_id, "identification sent");
        Ok(())
    }

    /// Sends `CMD_NEW_LEVEL`. Invalid input is rejected before anything is
    /// sent.
    pub async fn new_level(&self, params: &NewLevelParams) -> Result<(), ClientError> {
        let request = params.request()?;
        request.send(&self.conn).await?;
        tracing::info!(
            conn_id = %self.conn.id(),
            name = %params.name,
            "new level requested"
        );
        Ok(())
    }

    /// Installs `level` as the active level and returns the previous one.
    ///
    /// The scene releases its buffers for the old level before it sees the
    /// new one. Dropping the returned value releases the old level itself.
    pub fn swap_level(&mut self, level: Level) -> Option<Level> {
        self.scene.destroy_buffers();
        self.scene.init_buffers(&level);
        self.level.replace(level)
    }

    /// Decodes and applies one inbound message.
    ///
    /// Returns the opcode of the acknowledgement that was handled, or
    /// `None` when the message was ignored (unknown opcode) or discarded
    /// (malformed). Only transport failures while replying are errors.
    pub async fn handle_message(&mut self, data: &[u8]) -> Result<Option<Opcode>, ClientError> {
        let conn_id = self.conn.id();
        let ack = match Ack::decode(data) {
            Ok(Some(ack)) => ack,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!(
                    %conn_id, error = %e, len = data.len(),
                    "discarding malformed message"
                );
                return Ok(None);
            }
        };

        let opcode = ack.opcode();
        match ack {
            Ack::Ident => {
                tracing::info!(%conn_id, "identification acknowledged");
                if let Some(params) = self.config.auto_level.clone() {
                    match self.new_level(&params).await {
                        Ok(()) => {}
                        // Rejected before encoding: nothing was sent.
                        Err(ClientError::Protocol(e)) => {
                            tracing::warn!(
                                %conn_id, error = %e,
                                "skipping invalid automatic level request"
                            );
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
            Ack::NewLevel(level) => {
                tracing::info!(
                    %conn_id,
                    lid = level.lid,
                    nodes = level.nodes.len(),
                    links = level.links.len(),
                    "level received"
                );
                self.swap_level(*level);
            }
        }
        Ok(Some(opcode))
    }

    /// Runs the session until the server closes the connection or the
    /// receive timeout elapses.
    pub async fn run(&mut self) -> Result<(), ClientError> {
        self.open().await?;
        if let Some(creds) = self.config.credentials.clone() {
            self.identify(&creds.user_id, &creds.passhash).await?;
        }

        let conn_id = self.conn.id();
        loop {
            let received = match self.config.recv_timeout {
                Some(limit) => match tokio::time::timeout(limit, self.conn.recv()).await {
                    Ok(received) => received,
                    Err(_) => {
                        tracing::info!(%conn_id, "server silent, ending session");
                        break;
                    }
                },
                None => self.conn.recv().await,
            };

            let data = match received {
                Ok(Some(data)) => data,
                Ok(None) => {
                    tracing::info!(%conn_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    return Err(e.into());
                }
            };

            self.handle_message(&data).await?;
        }
        Ok(())
    }

    /// Closes the connection and hands back the scene and the last level.
    pub async fn close(self) -> Result<(S, Option<Level>), ClientError> {
        self.conn.close().await?;
        Ok((self.scene, self.level))
    }
}
