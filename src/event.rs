//! Events delivered to the connection owner.

use crate::error::Error;

/// One notification from a connection to its owner.
///
/// Payload-carrying variants borrow from the engine; owners that need the
/// bytes beyond the callback must copy them out.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// The handshake completed and the connection is open for messages.
    Open,
    /// A complete text message. The engine delivers the peer's bytes as-is
    /// and leaves UTF-8 validation to the layer that parses them.
    Text(&'a [u8]),
    /// A complete binary message.
    Binary(&'a [u8]),
    /// A pong, normally answering a ping this side sent.
    Pong(&'a [u8]),
    /// The peer sent a close frame. Carries the raw close payload (status
    /// code plus reason, when present).
    Close(&'a [u8]),
    /// The connection failed. Terminal: no further events follow.
    Error(&'a Error),
}

impl Event<'_> {
    /// Short name of the event kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Event::Open => "open",
            Event::Text(_) => "text",
            Event::Binary(_) => "binary",
            Event::Pong(_) => "pong",
            Event::Close(_) => "close",
            Event::Error(_) => "error",
        }
    }

    /// Message bytes, for the variants that carry them.
    #[must_use]
    pub const fn payload(&self) -> Option<&[u8]> {
        match self {
            Event::Text(bytes) | Event::Binary(bytes) | Event::Pong(bytes) | Event::Close(bytes) => {
                Some(bytes)
            }
            Event::Open | Event::Error(_) => None,
        }
    }
}

/// Owner callback: one closure per connection, receiving every event in
/// delivery order.
pub type EventHandler = Box<dyn FnMut(Event<'_>)>;
