//! Response decoder: a stateful, strictly sequential reader over one
//! inbound message.
//!
//! Every call consumes bytes; there is no rewind and no random access.
//! Callers pick the field shape at the call site, either with a typed
//! method (`short()`, `custom_array(..)`) or, when the shape is data-driven,
//! with [`Response::get`] over a closed [`FieldKind`].

use crate::converter::Converter;
use crate::cursor::{ByteReader, Endian, Width};
use crate::{ProtocolError, ProtocolResult};

/// The scalar and text field kinds of the wire format.
///
/// There is no `Custom` kind. Composite fields are read only
/// through [`Response::custom`] and [`Response::custom_array`], which take
/// the [`Converter`] as a typed argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned 8-bit integer.
    UByte,
    /// Unsigned 16-bit integer.
    Short,
    /// Unsigned 32-bit integer.
    Int,
    /// 64-bit IEEE-754 double.
    Double,
    /// A run of single-byte characters of the given length.
    String(usize),
}

impl FieldKind {
    /// Number of bytes the field occupies on the wire.
    pub const fn width(self) -> usize {
        match self {
            Self::UByte => 1,
            Self::Short => 2,
            Self::Int => 4,
            Self::Double => 8,
            Self::String(len) => len,
        }
    }
}

/// A decoded field, tagged with the kind it was read as.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UByte(u8),
    Short(u16),
    Int(u32),
    Double(f64),
    String(String),
}

/// Decoder over one inbound message.
#[derive(Debug)]
pub struct Response<'a> {
    reader: ByteReader<'a>,
    int_endian: Endian,
}

impl<'a> Response<'a> {
    /// Wraps an inbound message. Integers and doubles are little-endian.
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(data),
            int_endian: Endian::Little,
        }
    }

    /// Overrides the byte order used for SHORT and INT fields.
    pub const fn with_int_endian(mut self, endian: Endian) -> Self {
        self.int_endian = endian;
        self
    }

    /// Bytes consumed so far.
    pub const fn position(&self) -> usize {
        self.reader.position()
    }

    /// Bytes left in the message.
    pub const fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    /// Returns `true` once the whole message has been consumed.
    pub const fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }

    /// Reads the next field as `kind`.
    pub fn get(&mut self, kind: FieldKind) -> ProtocolResult<Value> {
        self.reader.ensure(kind.width())?;
        Ok(match kind {
            FieldKind::UByte => Value::UByte(self.ubyte()?),
            FieldKind::Short => Value::Short(self.short()?),
            FieldKind::Int => Value::Int(self.int()?),
            FieldKind::Double => Value::Double(self.double()?),
            FieldKind::String(len) => Value::String(self.string(len)?),
        })
    }

    pub fn ubyte(&mut self) -> ProtocolResult<u8> {
        let bytes = self.reader.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub fn short(&mut self) -> ProtocolResult<u16> {
        let value = self.reader.read_uint(Width::U16, self.int_endian)?;
        Ok(value as u16)
    }

    pub fn int(&mut self) -> ProtocolResult<u32> {
        let value = self.reader.read_uint(Width::U32, self.int_endian)?;
        Ok(value as u32)
    }

    pub fn double(&mut self) -> ProtocolResult<f64> {
        self.reader.read_f64(Endian::Little)
    }

    /// Reads `len` single-byte characters.
    pub fn string(&mut self, len: usize) -> ProtocolResult<String> {
        self.reader.read_string(len)
    }

    /// Reads exactly one converter element.
    pub fn custom<C: Converter>(&mut self, converter: &C) -> ProtocolResult<C::Output> {
        let bytes = self.reader.read_bytes(C::ELEMENT_SIZE)?;
        converter.decode(bytes)
    }

    /// Reads `count` converter elements, in stream order.
    ///
    /// The whole run is bounds-checked before anything is consumed or
    /// allocated, so a hostile count cannot trigger a huge allocation and a
    /// short message leaves the cursor untouched.
    pub fn custom_array<C: Converter>(
        &mut self,
        converter: &C,
        count: usize,
    ) -> ProtocolResult<Vec<C::Output>> {
        let total = count.checked_mul(C::ELEMENT_SIZE).ok_or_else(|| {
            ProtocolError::InvalidLength(format!(
                "{count} elements of {} bytes overflow",
                C::ELEMENT_SIZE
            ))
        })?;
        self.reader.ensure(total)?;

        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.custom(converter)?);
        }
        Ok(out)
    }
}
