//! Shared doubles for driving a connection the way an event loop would:
//! a scriptable transport, a connector that hands it out, and an event
//! recorder capturing what the owner callback saw.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use evws::protocol::apply_mask;
use evws::{
    Connection, Connector, Event, EventHandler, Interest, Limits, RandomSource, Transport,
    compute_accept_key,
};

/// Byte used by [`FixedRandom`]; handshake keys and mask keys are all made
/// of it, keeping every wire byte deterministic.
pub const MASK_FILL: u8 = 7;

/// One scripted transport reaction, consumed in order by reads.
#[derive(Debug)]
pub enum Step {
    Data(Vec<u8>),
    WouldBlock,
    Eof,
    Fail(io::ErrorKind),
}

#[derive(Default)]
struct ScriptedState {
    steps: VecDeque<Step>,
    written: Vec<u8>,
    interest: Interest,
    write_limit: Option<usize>,
}

/// Transport double with a scripted read side and a capturing write side.
///
/// Clones share state, so a test can keep one handle while the connection
/// owns the other and inspect traffic after teardown.
#[derive(Clone, Default)]
pub struct ScriptedTransport(Rc<RefCell<ScriptedState>>);

impl ScriptedTransport {
    pub fn push(&self, step: Step) {
        self.0.borrow_mut().steps.push_back(step);
    }

    pub fn push_data(&self, bytes: &[u8]) {
        self.push(Step::Data(bytes.to_vec()));
    }

    /// Cap how many bytes each write accepts, forcing partial flushes.
    pub fn limit_writes(&self, n: usize) {
        self.0.borrow_mut().write_limit = Some(n);
    }

    /// Drain and return everything written so far.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.0.borrow_mut().written)
    }

    /// The interest set most recently registered.
    pub fn interest(&self) -> Interest {
        self.0.borrow().interest
    }
}

impl Transport for ScriptedTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.0.borrow_mut();
        let Some(step) = state.steps.front_mut() else {
            return Err(io::ErrorKind::WouldBlock.into());
        };
        match step {
            Step::Data(data) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                data.drain(..n);
                let drained = data.is_empty();
                if drained {
                    state.steps.pop_front();
                }
                Ok(n)
            }
            Step::WouldBlock => {
                state.steps.pop_front();
                Err(io::ErrorKind::WouldBlock.into())
            }
            Step::Eof => Ok(0),
            Step::Fail(kind) => {
                let kind = *kind;
                state.steps.pop_front();
                Err(kind.into())
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.0.borrow_mut();
        let n = state.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        state.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn set_interest(&mut self, interest: Interest) -> io::Result<()> {
        self.0.borrow_mut().interest = interest;
        Ok(())
    }
}

/// Connector handing out one prepared [`ScriptedTransport`], or refusing.
pub struct ScriptedConnector {
    transport: Option<ScriptedTransport>,
    pub seen: Option<(String, u16, bool)>,
}

impl ScriptedConnector {
    pub fn serving(transport: ScriptedTransport) -> Self {
        Self {
            transport: Some(transport),
            seen: None,
        }
    }

    pub fn refusing() -> Self {
        Self {
            transport: None,
            seen: None,
        }
    }
}

impl Connector for ScriptedConnector {
    type Transport = ScriptedTransport;

    fn connect(&mut self, host: &str, port: u16, tls: bool) -> io::Result<ScriptedTransport> {
        self.seen = Some((host.to_string(), port, tls));
        self.transport
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"))
    }
}

/// Deterministic randomness: every byte is the wrapped constant.
pub struct FixedRandom(pub u8);

impl RandomSource for FixedRandom {
    fn fill(&mut self, buf: &mut [u8]) {
        buf.fill(self.0);
    }
}

/// Owned snapshot of one delivered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Logged {
    Open,
    Text(Vec<u8>),
    Binary(Vec<u8>),
    Pong(Vec<u8>),
    Close(Vec<u8>),
    Error(String),
}

pub type Log = Rc<RefCell<Vec<Logged>>>;

pub fn recorder() -> (EventHandler, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let handler = Box::new(move |event: Event<'_>| {
        let logged = match event {
            Event::Open => Logged::Open,
            Event::Text(bytes) => Logged::Text(bytes.to_vec()),
            Event::Binary(bytes) => Logged::Binary(bytes.to_vec()),
            Event::Pong(bytes) => Logged::Pong(bytes.to_vec()),
            Event::Close(bytes) => Logged::Close(bytes.to_vec()),
            Event::Error(err) => Logged::Error(err.to_string()),
        };
        sink.borrow_mut().push(logged);
    });
    (handler, log)
}

/// The Sec-WebSocket-Key a [`FixedRandom`]-driven connection sends.
pub fn client_key() -> String {
    BASE64.encode([MASK_FILL; 16])
}

/// A well-formed 101 response matching [`client_key`].
pub fn accept_response() -> Vec<u8> {
    format!(
        "HTTP/1.1 101 Switching Protocols\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Accept: {}\r\n\
         \r\n",
        compute_accept_key(&client_key())
    )
    .into_bytes()
}

/// Server-side frame bytes: unmasked, any payload length encoding.
pub fn server_frame(fin: bool, opcode: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 10);
    frame.push(if fin { 0x80 | opcode } else { opcode });
    let len = payload.len();
    if len > 65535 {
        frame.push(127);
        frame.extend_from_slice(&(len as u64).to_be_bytes());
    } else if len >= 126 {
        frame.push(126);
        frame.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        frame.push(len as u8);
    }
    frame.extend_from_slice(payload);
    frame
}

/// Decode one client-side frame from captured wire bytes.
///
/// Asserts the invariants every outbound frame must satisfy (FIN set, mask
/// bit set) and returns the opcode, the unmasked payload, and how many bytes
/// the frame occupied.
pub fn decode_client_frame(wire: &[u8]) -> (u8, Vec<u8>, usize) {
    assert!(wire.len() >= 2, "truncated frame header");
    assert_eq!(wire[0] & 0x80, 0x80, "client frames always carry FIN");
    assert_eq!(wire[0] & 0x70, 0, "client frames never set RSV bits");
    assert_eq!(wire[1] & 0x80, 0x80, "client frames are always masked");

    let opcode = wire[0] & 0x0F;
    let (len, mut offset) = match wire[1] & 0x7F {
        127 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&wire[2..10]);
            (u64::from_be_bytes(raw) as usize, 10)
        }
        126 => {
            let mut raw = [0u8; 2];
            raw.copy_from_slice(&wire[2..4]);
            (usize::from(u16::from_be_bytes(raw)), 4)
        }
        short => (usize::from(short), 2),
    };

    let mut key = [0u8; 4];
    key.copy_from_slice(&wire[offset..offset + 4]);
    offset += 4;

    let mut payload = wire[offset..offset + len].to_vec();
    apply_mask(&mut payload, key);
    (opcode, payload, offset + len)
}

/// Decode a whole captured stream of client frames.
pub fn decode_client_stream(wire: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < wire.len() {
        let (opcode, payload, consumed) = decode_client_frame(&wire[offset..]);
        frames.push((opcode, payload));
        offset += consumed;
    }
    frames
}

/// Start a connection against a scripted transport, without running the
/// handshake.
pub fn connect_ws(script: Vec<Step>) -> (Connection<ScriptedTransport>, ScriptedTransport, Log) {
    connect_url("ws://example.com/chat", None, Limits::default(), script)
}

pub fn connect_url(
    url: &str,
    protocol: Option<&str>,
    limits: Limits,
    script: Vec<Step>,
) -> (Connection<ScriptedTransport>, ScriptedTransport, Log) {
    let transport = ScriptedTransport::default();
    for step in script {
        transport.push(step);
    }
    let mut connector = ScriptedConnector::serving(transport.clone());
    let (handler, log) = recorder();
    let conn = Connection::connect_with(
        &mut connector,
        url,
        protocol,
        limits,
        Box::new(FixedRandom(MASK_FILL)),
        handler,
    )
    .expect("connection should start");
    (conn, transport, log)
}

/// Connect and run the handshake to completion; the request bytes are
/// discarded so captured writes start clean.
pub fn open_ws(script: Vec<Step>) -> (Connection<ScriptedTransport>, ScriptedTransport, Log) {
    open_url("ws://example.com/chat", None, Limits::default(), script)
}

pub fn open_url(
    url: &str,
    protocol: Option<&str>,
    limits: Limits,
    script: Vec<Step>,
) -> (Connection<ScriptedTransport>, ScriptedTransport, Log) {
    let mut full = vec![Step::Data(accept_response())];
    full.extend(script);
    let (mut conn, transport, log) = connect_url(url, protocol, limits, full);
    conn.on_ready(Interest::WRITABLE);
    transport.take_written();
    pump_read(&mut conn);
    assert_eq!(
        log.borrow().first(),
        Some(&Logged::Open),
        "handshake should open the connection"
    );
    (conn, transport, log)
}

/// Feed readable readiness until the script runs dry.
pub fn pump_read(conn: &mut Connection<ScriptedTransport>) {
    for _ in 0..512 {
        conn.on_ready(Interest::READABLE);
    }
}

/// Feed combined readiness, flushing replies as they are queued.
pub fn pump(conn: &mut Connection<ScriptedTransport>) {
    for _ in 0..512 {
        conn.on_ready(Interest::READABLE | Interest::WRITABLE);
    }
}
