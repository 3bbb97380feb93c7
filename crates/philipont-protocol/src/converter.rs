//! Value converters: pluggable decoders for fixed-size composite fields.
//!
//! A converter turns a run of exactly [`Converter::ELEMENT_SIZE`] bytes into
//! a domain value. The response decoder is generic over this trait, so a new
//! composite (a quaternion, a colour, ...) only needs a new implementation;
//! the decoder itself never changes.

use serde::{Deserialize, Serialize};

use crate::cursor::{ByteReader, Endian};
use crate::ProtocolResult;

/// Decodes one fixed-size element from the byte stream.
///
/// Implementations must be pure: the same bytes always give the same value,
/// with no side effects. The decoder hands `decode` a slice of exactly
/// `ELEMENT_SIZE` bytes.
pub trait Converter {
    /// The decoded element type.
    type Output;

    /// Number of bytes one element occupies on the wire.
    const ELEMENT_SIZE: usize;

    /// Decodes one element from `bytes`.
    fn decode(&self, bytes: &[u8]) -> ProtocolResult<Self::Output>;
}

/// A three-component vector of doubles.
///
/// Used for positions, velocities, wind, gravity and terrain samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Reads a [`Vec3`] as three consecutive little-endian doubles (x, y, z).
#[derive(Debug, Clone, Copy, Default)]
pub struct Vec3Converter;

impl Converter for Vec3Converter {
    type Output = Vec3;

    const ELEMENT_SIZE: usize = 3 * 8;

    fn decode(&self, bytes: &[u8]) -> ProtocolResult<Vec3> {
        let mut reader = ByteReader::new(bytes);
        let x = reader.read_f64(Endian::Little)?;
        let y = reader.read_f64(Endian::Little)?;
        let z = reader.read_f64(Endian::Little)?;
        Ok(Vec3 { x, y, z })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolError;

    fn vec3_bytes(x: f64, y: f64, z: f64) -> Vec<u8> {
        [x, y, z].iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_vec3_converter_element_size() {
        assert_eq!(Vec3Converter::ELEMENT_SIZE, 24);
    }

    #[test]
    fn test_vec3_converter_reads_x_y_z_in_order() {
        let bytes = vec3_bytes(1.0, -2.5, 1e9);
        let v = Vec3Converter.decode(&bytes).unwrap();
        assert_eq!(v, Vec3::new(1.0, -2.5, 1e9));
    }

    #[test]
    fn test_vec3_converter_short_run_fails() {
        let bytes = vec3_bytes(1.0, 2.0, 3.0);
        let err = Vec3Converter.decode(&bytes[..20]).unwrap_err();
        assert!(matches!(err, ProtocolError::Truncated { .. }));
    }

    #[test]
    fn test_vec3_from_array() {
        assert_eq!(Vec3::from([1.0, 2.0, 3.0]), Vec3::new(1.0, 2.0, 3.0));
    }
}
