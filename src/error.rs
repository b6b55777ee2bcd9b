//! Error types for the connection engine.
//!
//! Every error here is fatal to its connection: the engine reports it through
//! one terminal `Event::Error` callback and tears the connection down. Nothing
//! is retried internally.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can terminate a WebSocket connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The URL could not be parsed into a connectable endpoint.
    #[error("Invalid websocket URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure: connect, read, or write.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The peer closed the transport.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The server's upgrade response failed validation. Carries the entire
    /// raw header block the server sent.
    #[error("Handshake rejected: {0}")]
    HandshakeRejected(String),

    /// The response headers never terminated within the allowed size.
    #[error("Response headers too long: {size} bytes (max: {max})")]
    HeadersTooLong {
        /// Bytes buffered without finding the terminator.
        size: usize,
        /// Maximum allowed header block size.
        max: usize,
    },

    /// An inbound frame had a reserved header bit set.
    #[error("Unsupported RSV flag")]
    UnsupportedRsv,

    /// An inbound frame carried the mask bit. Servers must never mask.
    #[error("Masked frame")]
    MaskedFrame,

    /// A completed message began with an opcode the engine cannot dispatch.
    #[error("Unknown frame opcode: {0:#x}")]
    UnknownOpcode(u8),

    /// A fragmented message exceeded the fragment accumulator's capacity.
    #[error("Maximum fragment count exceeded: {count} (max: {max})")]
    TooManyFragments {
        /// Fragments the message would need.
        count: usize,
        /// Maximum allowed fragments.
        max: usize,
    },

    /// A message's total buffered size would exceed the configured maximum.
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Bytes the message would require.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
