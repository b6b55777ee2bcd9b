//! Transport boundary: non-blocking byte streams owned by an external loop.
//!
//! The engine never opens sockets or waits on them. The host supplies a
//! [`Connector`] that opens transports and an event loop that watches them,
//! calling back into the connection with readiness. TLS lives entirely on the
//! host's side of this boundary: an encrypted transport is just another
//! [`Transport`].

use std::io;
use std::ops::BitOr;

use url::Url;

use crate::error::{Error, Result};

/// A set of transport directions.
///
/// Serves both roles of the readiness contract: the engine registers the set
/// it wants to be woken for, and the loop reports the set that became ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interest {
    readable: bool,
    writable: bool,
}

impl Interest {
    /// No direction; registering this parks the connection.
    pub const NONE: Interest = Interest {
        readable: false,
        writable: false,
    };

    /// The read direction.
    pub const READABLE: Interest = Interest {
        readable: true,
        writable: false,
    };

    /// The write direction.
    pub const WRITABLE: Interest = Interest {
        readable: false,
        writable: true,
    };

    /// True if the set contains the read direction.
    #[must_use]
    pub const fn is_readable(self) -> bool {
        self.readable
    }

    /// True if the set contains the write direction.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        self.writable
    }

    /// True if the set is empty.
    #[must_use]
    pub const fn is_none(self) -> bool {
        !self.readable && !self.writable
    }
}

impl BitOr for Interest {
    type Output = Interest;

    fn bitor(self, rhs: Interest) -> Interest {
        Interest {
            readable: self.readable || rhs.readable,
            writable: self.writable || rhs.writable,
        }
    }
}

/// One non-blocking byte stream registered with the hosting event loop.
///
/// `read` and `write` follow `std::io` semantics: `Ok(0)` from `read` means
/// the peer closed, and `ErrorKind::WouldBlock` means no progress was
/// possible right now. Dropping the transport closes it and releases its
/// registration.
pub trait Transport {
    /// One non-blocking read into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// One non-blocking write of `buf`.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Replace the readiness set the loop should wake this connection for.
    fn set_interest(&mut self, interest: Interest) -> io::Result<()>;
}

/// Opens transports toward an endpoint.
///
/// The returned transport may still be connecting; the loop reports the first
/// write-readiness when the connection completes, which is also what flushes
/// the queued handshake request.
pub trait Connector {
    /// The transport type this connector produces.
    type Transport: Transport;

    /// Open a transport to `host:port`, TLS-wrapped if `tls` is set.
    fn connect(&mut self, host: &str, port: u16, tls: bool) -> io::Result<Self::Transport>;
}

/// A parsed WebSocket endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host to connect to, as written in the URL.
    pub host: String,
    /// Resolved port.
    pub port: u16,
    /// Whether the scheme selects TLS.
    pub tls: bool,
    /// Request target: path plus query.
    pub target: String,
}

impl Endpoint {
    /// Parse a `ws`/`wss`/`http`/`https` URL.
    ///
    /// `http` and `https` are aliases for `ws` and `wss`. A URL with no
    /// explicit port resolves to 80, and TLS on port 80 is overridden to 443.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for unparseable URLs, unsupported
    /// schemes, or URLs without a host.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|err| Error::InvalidUrl(err.to_string()))?;

        let tls = match url.scheme() {
            "ws" | "http" => false,
            "wss" | "https" => true,
            other => return Err(Error::InvalidUrl(format!("unsupported scheme: {other}"))),
        };

        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl("missing host".to_string()))?
            .to_string();

        let mut port = url.port().unwrap_or(80);
        if tls && port == 80 {
            port = 443;
        }

        let mut target = url.path().to_string();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }

        Ok(Self {
            host,
            port,
            tls,
            target,
        })
    }
}
