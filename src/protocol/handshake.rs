//! Client side of the HTTP Upgrade handshake (RFC 6455).
//!
//! Builds the fixed-shape upgrade request and validates the server's
//! response: status line, `Upgrade` header, `Connection` token list, and the
//! `Sec-WebSocket-Accept` hash. Validation failures carry the entire raw
//! header block so the owner can see exactly what the server said.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha1::{Digest, Sha1};

use crate::error::{Error, Result};
use crate::random::RandomSource;

/// The GUID appended to the client key for the Sec-WebSocket-Accept hash
/// (RFC 6455).
pub const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Computes the Sec-WebSocket-Accept value from the client's
/// Sec-WebSocket-Key.
///
/// The accept key is Base64(SHA-1(key ++ GUID)).
///
/// # Example
///
/// ```
/// use evws::compute_accept_key;
///
/// let key = "dGhlIHNhbXBsZSBub25jZQ==";
/// let accept = compute_accept_key(key);
/// assert_eq!(accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
/// ```
#[must_use]
pub fn compute_accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    let hash = hasher.finalize();
    BASE64.encode(hash)
}

/// Generate a fresh Sec-WebSocket-Key: 16 random bytes, base64-encoded.
pub(crate) fn generate_key(rng: &mut dyn RandomSource) -> String {
    let mut nonce = [0u8; 16];
    rng.fill(&mut nonce);
    BASE64.encode(nonce)
}

/// Build the upgrade request for `target` on `host`.
pub(crate) fn build_request(
    target: &str,
    host: &str,
    key: &str,
    protocol: Option<&str>,
) -> String {
    let mut request = format!(
        "GET {target} HTTP/1.1\r\n\
         Host: {host}\r\n\
         Connection: Upgrade\r\n\
         Upgrade: websocket\r\n\
         Sec-WebSocket-Key: {key}\r\n\
         Sec-WebSocket-Version: 13\r\n"
    );
    if let Some(protocol) = protocol {
        request.push_str(&format!("Sec-WebSocket-Protocol: {protocol}\r\n"));
    }
    request.push_str("\r\n");
    request
}

/// Find the CRLFCRLF terminator, scanning the newly appended bytes plus a
/// 3-byte overlap so a terminator split across reads is still found without
/// rescanning the whole buffer.
///
/// `prev_filled` is the buffer's filled length before the latest append.
/// Returns the offset at which the terminator begins.
pub(crate) fn find_terminator(buf: &[u8], prev_filled: usize) -> Option<usize> {
    let start = prev_filled.saturating_sub(3);
    buf[start..]
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| start + pos)
}

/// Validate a complete response header block against the request's `key`.
///
/// `block` is everything up to (excluding) the CRLFCRLF terminator. Checks,
/// in order: the `HTTP/1.1 101 ` status prefix, the `Upgrade` header equal to
/// `websocket`, the `Connection` header listing the `Upgrade` token, and the
/// accept hash.
///
/// # Errors
///
/// Returns [`Error::HandshakeRejected`] carrying the whole raw block when any
/// check fails.
pub(crate) fn validate_response(block: &[u8], key: &str) -> Result<()> {
    let text = String::from_utf8_lossy(block);
    if response_is_valid(&text, key) {
        Ok(())
    } else {
        Err(Error::HandshakeRejected(text.into_owned()))
    }
}

fn response_is_valid(text: &str, key: &str) -> bool {
    if !text.starts_with("HTTP/1.1 101 ") {
        return false;
    }

    let Some(upgrade) = header_value(text, "Upgrade") else {
        return false;
    };
    if !upgrade.eq_ignore_ascii_case("websocket") {
        return false;
    }

    let Some(connection) = header_value(text, "Connection") else {
        return false;
    };
    if !header_list_contains(&connection, "Upgrade") {
        return false;
    }

    let Some(accept) = header_value(text, "Sec-WebSocket-Accept") else {
        return false;
    };
    accept == compute_accept_key(key)
}

/// Value of the first header named `name`, unfolded and trimmed.
///
/// The name must sit flush at line start, immediately followed by a colon.
/// Folded continuation lines (leading SP or HT) extend the value and are
/// joined with a single space.
fn header_value(text: &str, name: &str) -> Option<String> {
    let mut lines = text.split("\r\n");
    lines.next()?; // status line

    let mut value: Option<String> = None;
    for line in lines {
        if let Some(joined) = &mut value {
            if line.starts_with(' ') || line.starts_with('\t') {
                joined.push(' ');
                joined.push_str(line.trim_matches([' ', '\t']));
                continue;
            }
            break;
        }
        if line.len() > name.len()
            && line.as_bytes()[name.len()] == b':'
            && line[..name.len()].eq_ignore_ascii_case(name)
        {
            value = Some(line[name.len() + 1..].trim_matches([' ', '\t']).to_string());
        }
    }
    // The join can leave edge whitespace: an empty continuation folds in as
    // a trailing space, a value starting on a continuation line as a leading
    // one.
    value.map(|joined| joined.trim_matches([' ', '\t']).to_string())
}

/// Membership test over an HTTP comma-separated list, case-insensitive.
fn header_list_contains(value: &str, token: &str) -> bool {
    value
        .split(',')
        .any(|element| element.trim_matches([' ', '\t']).eq_ignore_ascii_case(token))
}
