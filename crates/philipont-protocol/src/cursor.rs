//! Primitive codec: fixed-width scalars and raw byte runs over a cursor.
//!
//! The Philipont wire format mixes conventions (outbound identity and
//! version fields are big-endian, inbound doubles are little-endian), so
//! nothing here has a default byte order. Every call names its [`Width`]
//! and [`Endian`].
//!
//! Text fields are single-byte characters: each byte is one Latin-1
//! code point, in both directions.

use crate::{ProtocolError, ProtocolResult};

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Width of an unsigned integer field.
///
/// A closed set instead of a free-form bit count, so an impossible width
/// (say, 12 bits) cannot be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    U8,
    U16,
    U32,
    U64,
}

impl Width {
    /// Number of bytes this width occupies on the wire.
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }

    /// Number of bits this width occupies on the wire.
    pub const fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// A read cursor over an inbound message.
///
/// All reads are bounds-checked up front: either the whole field is
/// available and the cursor advances by exactly its width, or the read
/// fails with [`ProtocolError::Truncated`] and the cursor does not move.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position, in bytes from the start of the message.
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes not yet consumed.
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` once every byte has been consumed.
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails with `Truncated` unless `n` more bytes are available.
    pub fn ensure(&self, n: usize) -> ProtocolResult<()> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(ProtocolError::Truncated {
                needed: n,
                remaining,
            });
        }
        Ok(())
    }

    /// Reads an unsigned integer of the given width and byte order.
    pub fn read_uint(
        &mut self,
        width: Width,
        endian: Endian,
    ) -> ProtocolResult<u64> {
        let bytes = self.read_bytes(width.bytes())?;
        let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
        Ok(match endian {
            Endian::Big => bytes.iter().fold(0, fold),
            Endian::Little => bytes.iter().rev().fold(0, fold),
        })
    }

    /// Reads an IEEE-754 double.
    pub fn read_f64(&mut self, endian: Endian) -> ProtocolResult<f64> {
        let bits = self.read_uint(Width::U64, endian)?;
        Ok(f64::from_bits(bits))
    }

    /// Reads a raw run of `n` bytes, borrowed from the message.
    pub fn read_bytes(&mut self, n: usize) -> ProtocolResult<&'a [u8]> {
        self.ensure(n)?;
        let run = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(run)
    }

    /// Reads `n` single-byte characters as text.
    pub fn read_string(&mut self, n: usize) -> ProtocolResult<String> {
        let bytes = self.read_bytes(n)?;
        Ok(decode_latin1(bytes))
    }
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// An append-only cursor over an outbound buffer.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer and returns its buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Appends a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Appends an unsigned integer using exactly `width` bytes.
    ///
    /// Fails with `MalformedInput` if `value` does not fit in `width`;
    /// nothing is written in that case.
    pub fn write_uint(
        &mut self,
        value: u64,
        width: Width,
        endian: Endian,
    ) -> ProtocolResult<()> {
        let n = width.bytes();
        if width != Width::U64 && value >> width.bits() != 0 {
            return Err(ProtocolError::MalformedInput(format!(
                "value {value} does not fit in {} bits",
                width.bits()
            )));
        }
        match endian {
            Endian::Big => self.buf.extend_from_slice(&value.to_be_bytes()[8 - n..]),
            Endian::Little => self.buf.extend_from_slice(&value.to_le_bytes()[..n]),
        }
        Ok(())
    }

    /// Appends an IEEE-754 double.
    pub fn write_f64(&mut self, value: f64, endian: Endian) {
        let bytes = match endian {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };
        self.buf.extend_from_slice(&bytes);
    }

    /// Appends a raw byte run.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends `bytes` right-padded with NUL to exactly `len` bytes.
    ///
    /// A run longer than `len` is rejected, never truncated.
    pub fn write_padded(&mut self, bytes: &[u8], len: usize) -> ProtocolResult<()> {
        if bytes.len() > len {
            return Err(ProtocolError::MalformedInput(format!(
                "{} bytes do not fit in a {len}-byte field",
                bytes.len()
            )));
        }
        self.buf.extend_from_slice(bytes);
        self.buf.resize(self.buf.len() + (len - bytes.len()), 0);
        Ok(())
    }

    /// Appends `text` as single-byte characters.
    pub fn write_string(&mut self, text: &str) -> ProtocolResult<()> {
        let bytes = encode_latin1(text)?;
        self.buf.extend_from_slice(&bytes);
        Ok(())
    }
}

/// Encodes text as one byte per character.
///
/// Characters above U+00FF have no single-byte form and are rejected.
pub fn encode_latin1(text: &str) -> ProtocolResult<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                ProtocolError::MalformedInput(format!(
                    "character {c:?} is not a single-byte character"
                ))
            })
        })
        .collect()
}

/// Decodes one character per byte.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
