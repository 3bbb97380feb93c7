//! Request encoder: builds one outbound message field by field.
//!
//! A [`Request`] is a thin builder over a [`ByteWriter`]. Fallible appends
//! return `&mut Self` so a command can be written as one `?`-chained
//! expression. [`Request::send`] is the only place a finished buffer meets
//! the transport.

use philipont_transport::Connection;

use crate::cursor::{encode_latin1, ByteWriter, Endian, Width};
use crate::{Opcode, ProtocolResult};

/// An outbound message under construction.
#[derive(Debug, Default, Clone)]
pub struct Request {
    writer: ByteWriter,
}

impl Request {
    /// Creates a request with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request whose first byte is `opcode`.
    pub fn command(opcode: Opcode) -> Self {
        debug_assert!(opcode.is_command(), "{opcode} is an acknowledgement");
        let mut request = Self::new();
        request.append_byte(opcode.byte());
        request
    }

    /// Appends one byte.
    pub fn append_byte(&mut self, value: u8) -> &mut Self {
        self.writer.write_u8(value);
        self
    }

    /// Appends an unsigned integer of `width`.
    ///
    /// The protocol writes identity and length fields big-endian; pass
    /// [`Endian::Big`] unless a command says otherwise.
    pub fn append_fixed(
        &mut self,
        value: u64,
        width: Width,
        endian: Endian,
    ) -> ProtocolResult<&mut Self> {
        self.writer.write_uint(value, width, endian)?;
        Ok(self)
    }

    /// Appends a 64-bit double.
    pub fn append_f64(&mut self, value: f64, endian: Endian) -> &mut Self {
        self.writer.write_f64(value, endian);
        self
    }

    /// Appends text as single-byte characters.
    ///
    /// With `pad_to`, the field is exactly that many bytes: shorter text is
    /// right-padded with NUL, longer text is rejected with `MalformedInput`.
    pub fn append_string(
        &mut self,
        text: &str,
        pad_to: Option<usize>,
    ) -> ProtocolResult<&mut Self> {
        let bytes = encode_latin1(text)?;
        self.append_bytes(&bytes, pad_to)
    }

    /// Appends a raw byte run, optionally padded to a fixed field length.
    pub fn append_bytes(
        &mut self,
        bytes: &[u8],
        pad_to: Option<usize>,
    ) -> ProtocolResult<&mut Self> {
        match pad_to {
            Some(len) => self.writer.write_padded(bytes, len)?,
            None => self.writer.write_bytes(bytes),
        }
        Ok(self)
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.writer.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    /// The encoded message.
    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_bytes()
    }

    /// Consumes the request and returns the encoded message.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    /// Hands the finished message to the transport.
    pub async fn send<C: Connection>(self, conn: &C) -> Result<(), C::Error> {
        tracing::trace!(conn_id = %conn.id(), len = self.len(), "sending request");
        conn.send(self.writer.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolError;

    #[test]
    fn test_new_request_is_empty() {
        assert!(Request::new().is_empty());
    }

    #[test]
    fn test_command_starts_with_opcode() {
        let request = Request::command(Opcode::Ident);
        assert_eq!(request.as_bytes(), &[0x0F]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is an acknowledgement")]
    fn test_command_refuses_ack_opcode() {
        let _ = Request::command(Opcode::AckIdent);
    }

    #[test]
    fn test_chained_appends() -> ProtocolResult<()> {
        let mut request = Request::new();
        request
            .append_byte(0xAA)
            .append_fixed(63, Width::U32, Endian::Big)?
            .append_string("ok", Some(4))?
            .append_f64(1.0, Endian::Little);

        let mut expected = vec![0xAA, 0, 0, 0, 63, b'o', b'k', 0, 0];
        expected.extend_from_slice(&1.0f64.to_le_bytes());
        assert_eq!(request.into_bytes(), expected);
        Ok(())
    }

    #[test]
    fn test_append_string_without_padding() {
        let mut request = Request::new();
        request.append_string("WOOHOO!", None).unwrap();
        assert_eq!(request.as_bytes(), b"WOOHOO!");
    }

    #[test]
    fn test_append_string_longer_than_field_is_rejected() {
        let mut request = Request::new();
        let err = request.append_string("too long", Some(3)).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedInput(_)));
        assert!(request.is_empty());
    }

    #[test]
    fn test_append_fixed_rejects_oversized_value() {
        let mut request = Request::new();
        assert!(request.append_fixed(70_000, Width::U16, Endian::Big).is_err());
        assert!(request.is_empty());
    }
}
