//! WebSocket frame decoding and encoding (RFC 6455).
//!
//! The decoder is incremental: it works over whatever prefix of a message the
//! input buffer holds and either produces a complete message or reports the
//! total byte count that must be buffered before the next attempt. Nothing is
//! consumed until a whole message (all fragments) is present.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |                         Masking key (if MASK)                 |
//! +---------------------------------------------------------------+
//! |                         Payload data                          |
//! +---------------------------------------------------------------+
//! ```

use std::ops::Range;

use crate::buffer::Buffer;
use crate::config::Limits;
use crate::error::{Error, Result};
use crate::protocol::OpCode;
use crate::protocol::mask::apply_mask;

/// Decoded view of one inbound frame header.
///
/// Inbound means server-originated here: the parser enforces clear reserved
/// bits and a clear mask bit, both fatal violations on this side of the
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameHeader {
    /// Final fragment flag.
    pub fin: bool,
    /// Raw low 4 bits of the first header byte. Validated only when a
    /// completed message is dispatched, so mid-message fragments pass
    /// through untouched.
    pub opcode: u8,
    /// Declared payload length.
    pub payload_len: u64,
    /// Bytes the header itself occupies.
    pub header_len: usize,
}

/// Outcome of parsing one header at the start of `buf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderStatus {
    /// Total bytes from the frame's start needed to finish the header.
    Partial(usize),
    /// Header fully parsed.
    Complete(FrameHeader),
}

/// Parse one frame header from the start of `buf`.
///
/// # Errors
///
/// - [`Error::UnsupportedRsv`] if any reserved bit is set.
/// - [`Error::MaskedFrame`] if the mask bit is set.
pub(crate) fn parse_header(buf: &[u8]) -> Result<HeaderStatus> {
    if buf.len() < 2 {
        return Ok(HeaderStatus::Partial(2));
    }

    let byte0 = buf[0];
    let byte1 = buf[1];

    if byte0 & 0x70 != 0 {
        return Err(Error::UnsupportedRsv);
    }
    if byte1 & 0x80 != 0 {
        return Err(Error::MaskedFrame);
    }

    let fin = byte0 & 0x80 != 0;
    let opcode = byte0 & 0x0F;

    let (payload_len, header_len) = match byte1 & 0x7F {
        127 => {
            if buf.len() < 10 {
                return Ok(HeaderStatus::Partial(10));
            }
            let len = u64::from_be_bytes([
                buf[2], buf[3], buf[4], buf[5], buf[6], buf[7], buf[8], buf[9],
            ]);
            (len, 10)
        }
        126 => {
            if buf.len() < 4 {
                return Ok(HeaderStatus::Partial(4));
            }
            (u64::from(u16::from_be_bytes([buf[2], buf[3]])), 4)
        }
        short => (u64::from(short), 2),
    };

    Ok(HeaderStatus::Complete(FrameHeader {
        fin,
        opcode,
        payload_len,
        header_len,
    }))
}

/// A complete logical message gathered from one or more frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GatheredMessage {
    /// Raw opcode bits of the first frame.
    pub opcode: u8,
    /// Payload ranges of each fragment, in arrival order, indexing `buf`.
    pub spans: Vec<Range<usize>>,
    /// Total bytes the message occupies from the start of `buf`.
    pub consumed: usize,
}

/// Outcome of a decode attempt over the buffered bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Gather {
    /// Total buffered bytes required before decoding can progress.
    Need(usize),
    /// One whole message is present.
    Message(GatheredMessage),
}

/// Walk frames from the start of `buf` until a FIN frame completes a message.
///
/// `buf` must begin at a frame boundary; the caller consumes whole messages
/// from the front of its input buffer, so position zero is always the current
/// message's first frame.
///
/// # Errors
///
/// Header violations from [`parse_header`], [`Error::TooManyFragments`] once
/// the accumulator is full and no FIN has arrived, and
/// [`Error::MessageTooLarge`] when the message's total buffered size would
/// exceed `limits.max_message_size`.
pub(crate) fn gather_message(buf: &[u8], limits: &Limits) -> Result<Gather> {
    let mut spans: Vec<Range<usize>> = Vec::new();
    let mut first_opcode = 0u8;
    let mut offset = 0usize;

    loop {
        limits.check_fragment_count(spans.len() + 1)?;

        let header = match parse_header(&buf[offset..])? {
            HeaderStatus::Partial(needed) => return Ok(Gather::Need(offset + needed)),
            HeaderStatus::Complete(header) => header,
        };

        let total = message_total(offset, &header, limits)?;
        if buf.len() < total {
            return Ok(Gather::Need(total));
        }

        if spans.is_empty() {
            first_opcode = header.opcode;
        }
        spans.push(offset + header.header_len..total);
        offset = total;

        if header.fin {
            return Ok(Gather::Message(GatheredMessage {
                opcode: first_opcode,
                spans,
                consumed: offset,
            }));
        }
    }
}

/// Total message size through this frame, checked against the size limit
/// before the caller grows its buffer toward it.
fn message_total(offset: usize, header: &FrameHeader, limits: &Limits) -> Result<usize> {
    let so_far = (offset + header.header_len) as u64;
    let total = so_far
        .checked_add(header.payload_len)
        .filter(|total| *total <= limits.max_message_size as u64)
        .ok_or(Error::MessageTooLarge {
            size: so_far
                .saturating_add(header.payload_len)
                .min(usize::MAX as u64) as usize,
            max: limits.max_message_size,
        })?;
    Ok(total as usize)
}

/// Append one complete outbound frame to `out`: FIN set, mask bit set, the
/// payload XORed with `key`.
pub(crate) fn encode_frame(out: &mut Buffer, opcode: OpCode, payload: &[u8], key: [u8; 4]) {
    out.put_u8(0x80 | opcode.as_u8());

    let len = payload.len();
    if len > 65535 {
        out.put_u8(0x80 | 127);
        out.put_slice(&(len as u64).to_be_bytes());
    } else if len >= 126 {
        out.put_u8(0x80 | 126);
        out.put_slice(&(len as u16).to_be_bytes());
    } else {
        out.put_u8(0x80 | len as u8);
    }

    out.put_slice(&key);

    let mut masked = payload.to_vec();
    apply_mask(&mut masked, key);
    out.put_slice(&masked);
}
