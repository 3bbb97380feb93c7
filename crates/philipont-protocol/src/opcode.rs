//! Opcode registry shared by the encode and decode paths.
//!
//! Every message on the wire, in both directions, starts with one opcode
//! byte. Commands flow client → server, acknowledgements server → client.
//! The protocol carries no version field, so this enumeration is the single
//! place the byte values are written down.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Identifier byte sent alone as the first frame after the socket opens.
pub const MAGIC_ID: u8 = 0x02;

/// Maximum number of link references stored per node.
pub const NODE_MAX_LINKS: usize = 32;

/// Number of node references carried by every link.
pub const LINK_NODE_SLOTS: usize = 4;

/// Returns the one-byte handshake frame sent when the connection opens.
pub fn handshake_frame() -> [u8; 1] {
    [MAGIC_ID]
}

/// A command or acknowledgement opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // -- Commands (client → server) --
    NewLevel = 0x00,
    LoadLevel = 0x01,
    SaveLevel = 0x02,
    UpdateLevel = 0x03,
    Ident = 0x0F,
    Simulate = 0x10,
    Play = 0x11,
    Pause = 0x12,
    Speed = 0x13,

    // -- Acknowledgements (server → client) --
    AckNewLevel = 0xF0,
    AckIdent = 0xFF,
}

impl Opcode {
    /// The byte written on the wire.
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Returns `true` for server → client acknowledgements.
    pub const fn is_ack(self) -> bool {
        matches!(self, Self::AckIdent | Self::AckNewLevel)
    }

    /// Returns `true` for client → server commands.
    pub const fn is_command(self) -> bool {
        !self.is_ack()
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            0x00 => Self::NewLevel,
            0x01 => Self::LoadLevel,
            0x02 => Self::SaveLevel,
            0x03 => Self::UpdateLevel,
            0x0F => Self::Ident,
            0x10 => Self::Simulate,
            0x11 => Self::Play,
            0x12 => Self::Pause,
            0x13 => Self::Speed,
            0xF0 => Self::AckNewLevel,
            0xFF => Self::AckIdent,
            other => return Err(ProtocolError::UnknownOpcode(other)),
        })
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({:#04x})", self.byte())
    }
}

/// Visual and physical environment preset of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Skin {
    Earth = 0,
    Mars = 1,
    Moon = 2,
    Venus = 3,
}

impl TryFrom<u32> for Skin {
    type Error = u32;

    /// Maps a wire value to a skin, handing back unknown values unchanged.
    fn try_from(value: u32) -> Result<Self, u32> {
        match value {
            0 => Ok(Self::Earth),
            1 => Ok(Self::Mars),
            2 => Ok(Self::Moon),
            3 => Ok(Self::Venus),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Opcode; 11] = [
        Opcode::NewLevel,
        Opcode::LoadLevel,
        Opcode::SaveLevel,
        Opcode::UpdateLevel,
        Opcode::Ident,
        Opcode::Simulate,
        Opcode::Play,
        Opcode::Pause,
        Opcode::Speed,
        Opcode::AckNewLevel,
        Opcode::AckIdent,
    ];

    #[test]
    fn test_opcode_wire_values() {
        assert_eq!(Opcode::Ident.byte(), 0x0F);
        assert_eq!(Opcode::NewLevel.byte(), 0x00);
        assert_eq!(Opcode::Speed.byte(), 0x13);
        assert_eq!(Opcode::AckIdent.byte(), 0xFF);
        assert_eq!(Opcode::AckNewLevel.byte(), 0xF0);
    }

    #[test]
    fn test_opcode_try_from_matches_byte() {
        for op in ALL {
            assert_eq!(Opcode::try_from(op.byte()).unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_opcode_is_rejected() {
        assert_eq!(
            Opcode::try_from(0x42).unwrap_err(),
            ProtocolError::UnknownOpcode(0x42)
        );
    }

    #[test]
    fn test_ack_and_command_partition() {
        let acks: Vec<_> = ALL.iter().filter(|op| op.is_ack()).collect();
        assert_eq!(acks, vec![&Opcode::AckNewLevel, &Opcode::AckIdent]);
        assert!(Opcode::Play.is_command());
    }

    #[test]
    fn test_handshake_frame_is_magic_byte() {
        assert_eq!(handshake_frame(), [0x02]);
    }

    #[test]
    fn test_opcode_display() {
        assert_eq!(Opcode::AckIdent.to_string(), "AckIdent(0xff)");
    }

    #[test]
    fn test_skin_from_wire_value() {
        assert_eq!(Skin::try_from(0), Ok(Skin::Earth));
        assert_eq!(Skin::try_from(3), Ok(Skin::Venus));
        assert_eq!(Skin::try_from(9), Err(9));
    }
}
