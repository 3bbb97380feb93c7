//! Client configuration and its builder.

use std::time::Duration;

use philipont_protocol::NewLevelParams;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Identity sent with `CMD_IDENT` right after the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// User id, at most 32 single-byte characters.
    pub user_id: String,
    /// Password hash, exactly 32 bytes.
    pub passhash: Vec<u8>,
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Client`](crate::Client) session.
///
/// Start from [`ClientConfig::default()`] or [`ClientConfig::builder()`]
/// and override only the fields you care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket URL of the simulation server.
    pub url: String,

    /// Identity to send once the connection is open. `None` skips
    /// identification; the caller can identify manually later.
    pub credentials: Option<Credentials>,

    /// Longest silence tolerated from the server before the session loop
    /// gives up. `None` waits forever.
    pub recv_timeout: Option<Duration>,

    /// Level to request automatically once the server acknowledges the
    /// identification.
    pub auto_level: Option<NewLevelParams>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8080".to_string(),
            credentials: None,
            recv_timeout: Some(Duration::from_secs(15)),
            auto_level: None,
        }
    }
}

impl ClientConfig {
    /// Creates a builder with default settings.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for [`ClientConfig`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use philipont::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .url("ws://sim.example:9000")
///     .credentials("12", [b'0'; 32])
///     .recv_timeout(Some(Duration::from_secs(30)))
///     .build();
/// assert_eq!(config.url, "ws://sim.example:9000");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server URL.
    pub fn url(mut self, url: &str) -> Self {
        self.config.url = url.to_string();
        self
    }

    /// Sets the identity sent after the handshake.
    pub fn credentials(mut self, user_id: &str, passhash: impl Into<Vec<u8>>) -> Self {
        self.config.credentials = Some(Credentials {
            user_id: user_id.to_string(),
            passhash: passhash.into(),
        });
        self
    }

    /// Sets the receive timeout.
    pub fn recv_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.recv_timeout = timeout;
        self
    }

    /// Requests this level automatically after `ACK_IDENT`.
    pub fn auto_level(mut self, params: NewLevelParams) -> Self {
        self.config.auto_level = Some(params);
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
