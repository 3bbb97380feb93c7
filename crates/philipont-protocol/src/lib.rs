//! Wire protocol for the Philipont bridge-simulation client.
//!
//! This crate defines the binary "language" the client and the simulation
//! server speak:
//!
//! - **Primitive codec** ([`ByteReader`], [`ByteWriter`]) — fixed-width
//!   scalars and byte runs with explicit [`Width`] and [`Endian`].
//! - **Converters** ([`Converter`], [`Vec3Converter`]) — pluggable decoders
//!   for fixed-size composite fields.
//! - **Requests** ([`Request`], [`identify`], [`new_level`]) — outbound
//!   commands.
//! - **Responses** ([`Response`], [`Ack`], [`Level`]) — inbound
//!   acknowledgements and the level decode script.
//! - **Registry** ([`Opcode`], [`Skin`]) — the byte values shared by both
//!   directions.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw messages) and the client
//! session (level ownership). It never opens sockets; the only contact with
//! the transport is [`Request::send`].
//!
//! ```text
//! Transport (messages) → Protocol (Ack / Level) → Client (Scene)
//! ```
//!
//! # Example
//!
//! ```rust
//! use philipont_protocol::{new_level, Ack, Opcode};
//!
//! let request = new_level("WOOHOO!", "Phil za best", 10.0, 10.0, 0.5).unwrap();
//! assert_eq!(request.as_bytes()[0], Opcode::NewLevel.byte());
//!
//! assert_eq!(Ack::decode(&[0xFF]).unwrap(), Some(Ack::Ident));
//! ```

mod commands;
mod converter;
mod cursor;
mod error;
mod level;
mod opcode;
mod request;
mod response;

pub use commands::{
    identify, new_level, Ack, NewLevelParams, LEVEL_FORMAT_VERSION,
    MAX_NAME_LEN, PASSHASH_LEN, RESERVED_LEN, USER_ID_LEN,
};
pub use converter::{Converter, Vec3, Vec3Converter};
pub use cursor::{ByteReader, ByteWriter, Endian, Width};
pub use error::{ProtocolError, ProtocolResult};
pub use level::{
    heightmap_len, EditorGrid, Environment, Level, Link, Node, Road,
    Terrain, AUTH_TOKEN_LEN, MAX_HEIGHTMAP_CELLS,
};
pub use opcode::{
    handshake_frame, Opcode, Skin, LINK_NODE_SLOTS, MAGIC_ID, NODE_MAX_LINKS,
};
pub use request::Request;
pub use response::{FieldKind, Response, Value};
