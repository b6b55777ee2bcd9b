//! # evws - Event-loop Driven WebSocket Client Engine
//!
//! `evws` is a non-blocking, RFC 6455 client-side WebSocket engine for hosts
//! that already run their own event loop.
//!
//! ## Features
//!
//! - **Readiness-driven core** with one read and one write per wakeup, no
//!   internal threads or runtime
//! - **Transport-agnostic**: bring your own sockets, proxies, and TLS through
//!   the `Transport` and `Connector` traits
//! - **Full client handshake** with `Sec-WebSocket-Accept` verification
//! - **Streaming frame decoder** with fragmentation reassembly and
//!   configurable resource limits
//! - **Single owner callback** receiving every connection event in order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evws::{Connection, Event, Interest};
//!
//! let mut connection = Connection::connect(
//!     &mut connector,
//!     "wss://example.com/live",
//!     None,
//!     Box::new(|event| println!("{}", event.name())),
//! )?;
//!
//! // From the event loop, whenever the transport becomes ready:
//! connection.on_ready(Interest::READABLE | Interest::WRITABLE);
//! ```

mod buffer;

pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod protocol;
pub mod random;
pub mod transport;

pub use config::Limits;
pub use connection::{Connection, ConnectionState};
pub use error::{Error, Result};
pub use event::{Event, EventHandler};
pub use protocol::{OpCode, WEBSOCKET_GUID, compute_accept_key};
pub use random::{RandomSource, SystemRandom};
pub use transport::{Connector, Endpoint, Interest, Transport};
