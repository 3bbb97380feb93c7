//! Domain-level commands and acknowledgement dispatch.
//!
//! Command builders validate their inputs before a single byte is written:
//! a rejected command yields `MalformedInput` and no [`Request`], so nothing
//! can reach the transport half-built.

use serde::{Deserialize, Serialize};

use crate::cursor::{encode_latin1, Endian, Width};
use crate::level::{heightmap_len, Level, MAX_HEIGHTMAP_CELLS};
use crate::response::Response;
use crate::{Opcode, ProtocolError, ProtocolResult, Request};

/// Width of the user id field in `CMD_IDENT`.
pub const USER_ID_LEN: usize = 32;

/// Required length of the password hash in `CMD_IDENT`.
pub const PASSHASH_LEN: usize = 32;

/// Width in bytes of the reserved field that opens `CMD_NEW_LEVEL`.
pub const RESERVED_LEN: usize = 32;

/// Level format version written into the reserved field of `CMD_NEW_LEVEL`.
pub const LEVEL_FORMAT_VERSION: u8 = 63;

/// Longest level name or designer name, in bytes.
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// Builds `CMD_IDENT`: opcode, user id padded to 32 bytes, 32-byte hash.
pub fn identify(user_id: &str, passhash: &[u8]) -> ProtocolResult<Request> {
    if passhash.len() != PASSHASH_LEN {
        return Err(ProtocolError::MalformedInput(format!(
            "password hash must be {PASSHASH_LEN} bytes, got {}",
            passhash.len()
        )));
    }
    let mut request = Request::command(Opcode::Ident);
    request
        .append_string(user_id, Some(USER_ID_LEN))?
        .append_bytes(passhash, None)?;
    Ok(request)
}

/// Builds `CMD_NEW_LEVEL`.
///
/// Layout: opcode, 32-byte reserved field holding the format version as a
/// zero-extended big-endian integer, UBYTE-prefixed name, UBYTE-prefixed designer, then terrain X,
/// Z and resolution as little-endian doubles.
pub fn new_level(
    name: &str,
    designer: &str,
    terrain_x: f64,
    terrain_z: f64,
    terrain_res: f64,
) -> ProtocolResult<Request> {
    let name = length_prefixed("name", name)?;
    let designer = length_prefixed("designer", designer)?;

    let cells = heightmap_len(terrain_x, terrain_z, terrain_res)
        .map_err(|e| ProtocolError::MalformedInput(e.to_string()))?;
    if cells > MAX_HEIGHTMAP_CELLS {
        return Err(ProtocolError::MalformedInput(format!(
            "terrain needs {cells} heightmap cells, limit is {MAX_HEIGHTMAP_CELLS}"
        )));
    }

    let mut request = Request::command(Opcode::NewLevel);
    request
        .append_bytes(&[0; RESERVED_LEN - 8], None)?
        .append_fixed(u64::from(LEVEL_FORMAT_VERSION), Width::U64, Endian::Big)?
        .append_bytes(&name, None)?
        .append_bytes(&designer, None)?
        .append_f64(terrain_x, Endian::Little)
        .append_f64(terrain_z, Endian::Little)
        .append_f64(terrain_res, Endian::Little);
    Ok(request)
}

/// Encodes `text` behind a one-byte length prefix.
fn length_prefixed(field: &str, text: &str) -> ProtocolResult<Vec<u8>> {
    let bytes = encode_latin1(text)?;
    let len = u8::try_from(bytes.len()).map_err(|_| {
        ProtocolError::MalformedInput(format!(
            "{field} is {} bytes, limit is {MAX_NAME_LEN}",
            bytes.len()
        ))
    })?;
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.push(len);
    out.extend_from_slice(&bytes);
    Ok(out)
}

/// Parameters of a `CMD_NEW_LEVEL` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLevelParams {
    pub name: String,
    pub designer: String,
    pub terrain_x: f64,
    pub terrain_z: f64,
    pub terrain_res: f64,
}

impl NewLevelParams {
    /// Builds the request for these parameters.
    pub fn request(&self) -> ProtocolResult<Request> {
        new_level(
            &self.name,
            &self.designer,
            self.terrain_x,
            self.terrain_z,
            self.terrain_res,
        )
    }
}

// ---------------------------------------------------------------------------
// Acknowledgements
// ---------------------------------------------------------------------------

/// A decoded server acknowledgement.
#[derive(Debug, Clone, PartialEq)]
pub enum Ack {
    /// The server accepted `CMD_IDENT`.
    Ident,
    /// The server created a level and sent its full state.
    NewLevel(Box<Level>),
}

impl Ack {
    /// Decodes one inbound message.
    ///
    /// Reads the leading opcode and runs the matching decode script.
    /// Returns `Ok(None)` for opcodes that are not acknowledgements this
    /// client handles; those messages are ignored, not reported.
    pub fn decode(data: &[u8]) -> ProtocolResult<Option<Self>> {
        let mut response = Response::new(data);
        let byte = response.ubyte()?;
        match Opcode::try_from(byte) {
            Ok(Opcode::AckIdent) => Ok(Some(Self::Ident)),
            Ok(Opcode::AckNewLevel) => {
                let level = Level::decode(&mut response)?;
                if !response.is_empty() {
                    tracing::debug!(
                        trailing = response.remaining(),
                        "ignoring trailing bytes after level"
                    );
                }
                Ok(Some(Self::NewLevel(Box::new(level))))
            }
            Ok(op) => {
                tracing::debug!(%op, "ignoring non-acknowledgement opcode");
                Ok(None)
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring message");
                Ok(None)
            }
        }
    }

    /// The opcode this acknowledgement was carried under.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Ident => Opcode::AckIdent,
            Self::NewLevel(_) => Opcode::AckNewLevel,
        }
    }
}
