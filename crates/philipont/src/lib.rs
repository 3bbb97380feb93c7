//! # Philipont
//!
//! Client for the Philipont bridge-simulation server.
//!
//! The server speaks a compact binary protocol over a WebSocket. This crate
//! ties the layers together: [`philipont_transport`] moves messages,
//! [`philipont_protocol`] encodes commands and decodes levels, and
//! [`Client`] owns the session and hands each new level to a [`Scene`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use philipont::prelude::*;
//!
//! # async fn demo() -> Result<(), ClientError> {
//! let config = ClientConfig::builder()
//!     .url("ws://127.0.0.1:8080")
//!     .credentials("12", *b"01234567890123456789012345678901")
//!     .build();
//! let mut client = Client::connect(config, LogScene).await?;
//! client.run().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod scene;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder, Credentials};
pub use error::ClientError;
pub use scene::{LogScene, Scene};

pub use philipont_protocol as protocol;
pub use philipont_transport as transport;

/// Commonly used types, for `use philipont::prelude::*`.
pub mod prelude {
    pub use crate::{
        Client, ClientConfig, ClientError, Credentials, LogScene, Scene,
    };
    pub use philipont_protocol::{
        Ack, Level, Link, NewLevelParams, Node, Opcode, Skin, Vec3,
    };
    pub use philipont_transport::{Connection, ConnectionId, TransportError};
}
