//! Error types for the protocol layer.
//!
//! Every failure here is local to one message: an encode error means
//! nothing was sent, a decode error means the inbound message is dropped.
//! Neither says anything about the health of the connection.

/// Errors that can occur while encoding requests or decoding responses.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// Fewer bytes remain in the message than the next field needs.
    ///
    /// Raised by every read on the decode side. The cursor is left where it
    /// was, so a field is never partially consumed.
    #[error("truncated message: field needs {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A caller-supplied value violates a size precondition of the command
    /// (oversized name, wrong hash length, terrain too large, ...).
    ///
    /// Detected before anything is handed to the transport.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A length derived from already-decoded fields is not usable
    /// (negative, non-finite or overflowing).
    #[error("invalid derived length: {0}")]
    InvalidLength(String),

    /// The leading byte of a message is not a known opcode.
    ///
    /// Dispatch ignores unknown acknowledgements; this variant only surfaces
    /// from [`Opcode::try_from`](crate::Opcode).
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
