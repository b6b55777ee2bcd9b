//! WebSocket connection management and state machine.
//!
//! This module provides the core `Connection` type: a client-side engine
//! driven entirely by readiness callbacks from the hosting event loop. It
//! performs the upgrade handshake, decodes inbound frames into complete
//! messages, and queues outbound frames, delivering everything that happens
//! to a single owner callback.
//!
//! ## Connection Lifecycle
//!
//! 1. **Connecting** - Transport opening, handshake request queued
//! 2. **Open** - Handshake accepted, messages flow in both directions
//! 3. **Closing** - Close frame sent or received, output draining
//! 4. **Closed** - Transport released
//!
//! ## Example
//!
//! ```rust,ignore
//! use evws::{Connection, Event, Interest};
//!
//! let mut connection = Connection::connect(
//!     &mut connector,
//!     "wss://chat.example/live",
//!     Some("chat.v2"),
//!     Box::new(|event| match event {
//!         Event::Open => println!("open"),
//!         Event::Text(bytes) => println!("text: {} bytes", bytes.len()),
//!         Event::Error(err) => eprintln!("failed: {err}"),
//!         _ => {}
//!     }),
//! )?;
//!
//! // From the event loop, whenever the transport reports readiness:
//! connection.on_ready(Interest::READABLE);
//! ```

mod state;

pub use state::ConnectionState;

#[allow(clippy::module_inception)]
mod connection;

pub use connection::Connection;
