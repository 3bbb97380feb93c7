//! Unified error type for the Philipont client.

use philipont_protocol::ProtocolError;
use philipont_transport::TransportError;

/// Top-level error that wraps the layer-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts transport and protocol errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (a command was rejected before sending).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
