//! The readiness-driven connection engine.

use std::io;

use bytes::{Bytes, BytesMut};

use crate::buffer::Buffer;
use crate::config::Limits;
use crate::error::Error;
use crate::event::{Event, EventHandler};
use crate::protocol::{
    Gather, GatheredMessage, OpCode, build_request, encode_frame, find_terminator, gather_message,
    generate_key, validate_response,
};
use crate::random::{RandomSource, SystemRandom};
use crate::transport::{Connector, Endpoint, Interest, Transport};

use super::ConnectionState;

macro_rules! debug_log {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        log::debug!($($arg)*);
    }};
}

/// A client WebSocket connection driven by readiness callbacks.
///
/// The connection owns its transport and two byte buffers. The hosting event
/// loop calls [`on_ready`](Connection::on_ready) whenever the transport
/// becomes readable or writable; everything else (handshake, frame decoding,
/// control replies, close sequencing) happens inside those calls, surfacing
/// to the owner through the event callback.
pub struct Connection<T> {
    callback: EventHandler,
    transport: Option<T>,
    input: Buffer,
    output: Buffer,
    /// Total input bytes the decoder needs before it can make progress.
    read_goal: usize,
    key: String,
    limits: Limits,
    rng: Box<dyn RandomSource>,
    connected: bool,
    read_closed: bool,
    write_closed: bool,
}

impl<T: Transport> Connection<T> {
    /// Open a connection to `url` with default [`Limits`] and operating
    /// system randomness.
    ///
    /// See [`connect_with`](Connection::connect_with).
    #[must_use]
    pub fn connect<C>(
        connector: &mut C,
        url: &str,
        protocol: Option<&str>,
        callback: EventHandler,
    ) -> Option<Self>
    where
        C: Connector<Transport = T>,
    {
        Self::connect_with(
            connector,
            url,
            protocol,
            Limits::default(),
            Box::new(SystemRandom),
            callback,
        )
    }

    /// Open a connection to `url`, queueing the upgrade request and
    /// registering read and write interest.
    ///
    /// `protocol` is sent as `Sec-WebSocket-Protocol` when present. The
    /// transport is opened through `connector`; the handshake request sits in
    /// the output buffer until the event loop reports the transport writable,
    /// which for a freshly opened socket also signals that the connect
    /// completed.
    ///
    /// Returns `None` when the connection could not be started. The callback
    /// has already received the [`Event::Error`] describing why; a returned
    /// connection never reports a synchronous error as well.
    #[must_use]
    pub fn connect_with<C>(
        connector: &mut C,
        url: &str,
        protocol: Option<&str>,
        limits: Limits,
        mut rng: Box<dyn RandomSource>,
        mut callback: EventHandler,
    ) -> Option<Self>
    where
        C: Connector<Transport = T>,
    {
        let endpoint = match Endpoint::parse(url) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                callback(Event::Error(&err));
                return None;
            }
        };

        debug_log!(
            "connecting to {}:{} (tls: {})",
            endpoint.host,
            endpoint.port,
            endpoint.tls
        );

        let key = generate_key(rng.as_mut());
        let request = build_request(&endpoint.target, &endpoint.host, &key, protocol);

        let mut transport = match connector.connect(&endpoint.host, endpoint.port, endpoint.tls) {
            Ok(transport) => transport,
            Err(err) => {
                let err = Error::from(err);
                callback(Event::Error(&err));
                return None;
            }
        };

        if let Err(err) = transport.set_interest(Interest::READABLE | Interest::WRITABLE) {
            let err = Error::from(err);
            callback(Event::Error(&err));
            return None;
        }

        let mut output = Buffer::new();
        output.put_slice(request.as_bytes());

        Some(Self {
            callback,
            transport: Some(transport),
            input: Buffer::with_capacity(limits.max_header_size),
            output,
            read_goal: limits.max_header_size,
            key,
            limits,
            rng,
            connected: false,
            read_closed: false,
            write_closed: false,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        if self.transport.is_none() {
            ConnectionState::Closed
        } else if !self.connected {
            ConnectionState::Connecting
        } else if self.read_closed || self.write_closed {
            ConnectionState::Closing
        } else {
            ConnectionState::Open
        }
    }

    /// True while the connection is open for sending and receiving.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Drive the connection after the event loop reported `readiness`.
    ///
    /// Performs at most one write and one read against the transport, in
    /// that order, then parses whatever arrived. Any number of events may be
    /// delivered to the callback from inside this call. Calling this on a
    /// closed connection is a no-op.
    pub fn on_ready(&mut self, readiness: Interest) {
        if self.transport.is_none() {
            return;
        }

        if readiness.is_writable() {
            self.flush_output();
        }

        if self.transport.is_some() && readiness.is_readable() {
            self.fill_input();
        }
    }

    /// Queue one message for delivery to the peer.
    ///
    /// The frame is appended to the output buffer and flushed as the
    /// transport accepts it. Sending [`OpCode::Close`] starts the close
    /// handshake: no further sends are allowed afterwards, and the
    /// connection tears down once the peer's close frame has arrived and the
    /// output has drained.
    ///
    /// # Panics
    ///
    /// Panics if the connection is not open (see
    /// [`ConnectionState::can_send`]) or if `opcode` is
    /// [`OpCode::Continuation`].
    pub fn send(&mut self, opcode: OpCode, payload: &[u8]) {
        assert!(
            self.state().can_send(),
            "send on a connection that is not open"
        );
        assert!(
            opcode.is_sendable(),
            "continuation frames cannot be sent directly"
        );
        self.queue_frame(opcode, payload);
    }

    /// Tear the connection down immediately.
    ///
    /// Drops the transport without a close handshake and without delivering
    /// any further events.
    pub fn abort(&mut self) {
        self.teardown();
    }

    /// One write attempt against the transport.
    fn flush_output(&mut self) {
        if self.output.is_empty() {
            return;
        }
        let Some(transport) = self.transport.as_mut() else {
            return;
        };

        match transport.write(self.output.pending()) {
            Ok(n) => {
                self.output.advance_consumed(n);
                if self.output.is_empty() {
                    self.refresh_interest();
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(err) => self.fail(Error::from(err)),
        }
    }

    /// Recompute the interest set after the output buffer changed shape.
    ///
    /// This is also where a finished close handshake tears the connection
    /// down: once the close reply has fully flushed and the peer's close has
    /// been seen, there is nothing left to wait for.
    fn refresh_interest(&mut self) {
        self.output.reset_if_drained();

        if self.output.is_empty() && self.read_closed {
            self.teardown();
            return;
        }

        let mut interest = Interest::READABLE;
        if !self.output.is_empty() {
            interest = interest | Interest::WRITABLE;
        }

        let result = match self.transport.as_mut() {
            Some(transport) => transport.set_interest(interest),
            None => return,
        };
        if let Err(err) = result {
            self.fail(Error::from(err));
        }
    }

    /// One read attempt against the transport, then parse progress.
    fn fill_input(&mut self) {
        let goal = self.read_goal;
        let Some(transport) = self.transport.as_mut() else {
            return;
        };

        let n = match transport.read(self.input.unfilled_to(goal)) {
            Ok(0) => {
                self.fail(Error::ConnectionClosed);
                return;
            }
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => return,
            Err(err) => {
                self.fail(Error::from(err));
                return;
            }
        };
        self.input.advance_filled(n);

        if !self.connected && !self.finish_handshake(n) {
            return;
        }

        self.decode_messages();
    }

    /// Look for the end of the response headers in the newly read bytes.
    ///
    /// Returns true once the connection is open and frame decoding may
    /// begin; the input buffer then starts at a frame boundary.
    fn finish_handshake(&mut self, appended: usize) -> bool {
        let prev_filled = self.input.filled() - appended;
        let Some(pos) = find_terminator(self.input.as_slice(), prev_filled) else {
            if self.input.filled() >= self.limits.max_header_size {
                self.fail(Error::HeadersTooLong {
                    size: self.input.filled(),
                    max: self.limits.max_header_size,
                });
            }
            return false;
        };

        if let Err(err) = validate_response(&self.input.as_slice()[..pos], &self.key) {
            self.fail(err);
            return false;
        }

        debug_log!("handshake complete");

        self.connected = true;
        self.emit(Event::Open);

        self.input.consume_front(pos + 4);
        self.read_goal = 2;
        true
    }

    /// Decode and dispatch complete messages while the buffer satisfies the
    /// read goal.
    fn decode_messages(&mut self) {
        while self.transport.is_some() && self.input.filled() >= self.read_goal {
            match gather_message(self.input.as_slice(), &self.limits) {
                Ok(Gather::Need(total)) => {
                    self.input.ensure(total);
                    self.read_goal = total;
                }
                Ok(Gather::Message(message)) => {
                    let payload = self.consolidate(&message);
                    self.dispatch(message.opcode, &payload);
                    if self.transport.is_none() {
                        return;
                    }
                    self.input.consume_front(message.consumed);
                    self.read_goal = 2;
                }
                Err(err) => {
                    self.fail(err);
                    return;
                }
            }
        }
    }

    /// Copy a gathered message's fragments into one contiguous payload.
    fn consolidate(&self, message: &GatheredMessage) -> Bytes {
        let total: usize = message.spans.iter().map(|span| span.len()).sum();
        let mut payload = BytesMut::with_capacity(total);
        let input = self.input.as_slice();
        for span in &message.spans {
            payload.extend_from_slice(&input[span.clone()]);
        }
        payload.freeze()
    }

    /// Route one complete message by its opcode.
    fn dispatch(&mut self, opcode: u8, payload: &[u8]) {
        debug_log!("message {:#x} len {}", opcode, payload.len());

        match OpCode::from_u8(opcode) {
            Some(OpCode::Text) => self.emit(Event::Text(payload)),
            Some(OpCode::Binary) => self.emit(Event::Binary(payload)),
            Some(OpCode::Pong) => self.emit(Event::Pong(payload)),
            Some(OpCode::Close) => {
                self.emit(Event::Close(payload));
                self.read_closed = true;
                if self.write_closed {
                    self.teardown();
                } else {
                    self.queue_frame(OpCode::Close, b"");
                }
            }
            Some(OpCode::Ping) => {
                if !self.write_closed {
                    self.queue_frame(OpCode::Pong, payload);
                }
            }
            Some(OpCode::Continuation) | None => self.fail(Error::UnknownOpcode(opcode)),
        }
    }

    /// Encode one masked frame into the output buffer and make sure the
    /// transport is watched for writability.
    fn queue_frame(&mut self, opcode: OpCode, payload: &[u8]) {
        let was_empty = self.output.is_empty();

        let mut key = [0u8; 4];
        self.rng.fill(&mut key);
        encode_frame(&mut self.output, opcode, payload, key);

        if opcode == OpCode::Close {
            self.write_closed = true;
        }

        if was_empty {
            self.refresh_interest();
        }
    }

    fn emit(&mut self, event: Event<'_>) {
        (self.callback)(event);
    }

    /// Deliver exactly one terminal error event, then tear down.
    fn fail(&mut self, err: Error) {
        if self.transport.is_none() {
            return;
        }
        self.emit(Event::Error(&err));
        self.teardown();
    }

    fn teardown(&mut self) {
        debug_log!("releasing transport");
        if let Some(mut transport) = self.transport.take() {
            let _ = transport.set_interest(Interest::NONE);
        }
        self.input = Buffer::new();
        self.output = Buffer::new();
    }
}
