//! WebSocket frame opcodes as defined in RFC 6455.

/// WebSocket frame opcode.
///
/// Defines the interpretation of the payload data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Continuation frame (0x0).
    ///
    /// Carries further fragments of a message after the initial frame. Never
    /// valid as the opcode of a message itself.
    Continuation = 0x0,

    /// Text frame (0x1).
    Text = 0x1,

    /// Binary frame (0x2).
    Binary = 0x2,

    /// Close frame (0x8).
    ///
    /// Starts or answers the close handshake. May carry a status code and
    /// reason.
    Close = 0x8,

    /// Ping frame (0x9).
    ///
    /// Keepalive probe. The engine answers pings itself.
    Ping = 0x9,

    /// Pong frame (0xA).
    ///
    /// Answer to a ping; may also arrive unsolicited as a heartbeat.
    Pong = 0xA,
}

impl OpCode {
    /// Interpret the low 4 bits of a frame's first header byte.
    ///
    /// Returns `None` for the reserved ranges (0x3..=0x7, 0xB..=0xF). The
    /// engine treats any message opcode it cannot dispatch as one fatal
    /// unknown-opcode error, so no distinction is kept among them.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x0 => Some(OpCode::Continuation),
            0x1 => Some(OpCode::Text),
            0x2 => Some(OpCode::Binary),
            0x8 => Some(OpCode::Close),
            0x9 => Some(OpCode::Ping),
            0xA => Some(OpCode::Pong),
            _ => None,
        }
    }

    /// Raw 4-bit wire value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Control frame opcodes: Close (0x8), Ping (0x9), Pong (0xA).
    #[inline]
    #[must_use]
    pub const fn is_control(self) -> bool {
        matches!(self, OpCode::Close | OpCode::Ping | OpCode::Pong)
    }

    /// Data frame opcodes: Continuation (0x0), Text (0x1), Binary (0x2).
    #[inline]
    #[must_use]
    pub const fn is_data(self) -> bool {
        matches!(self, OpCode::Continuation | OpCode::Text | OpCode::Binary)
    }

    /// Opcodes the owner may submit through `send`.
    ///
    /// Everything except `Continuation`: the engine writes whole messages as
    /// single frames and never fragments outbound.
    #[inline]
    #[must_use]
    pub const fn is_sendable(self) -> bool {
        !matches!(self, OpCode::Continuation)
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            OpCode::Continuation => "Continuation",
            OpCode::Text => "Text",
            OpCode::Binary => "Binary",
            OpCode::Close => "Close",
            OpCode::Ping => "Ping",
            OpCode::Pong => "Pong",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
