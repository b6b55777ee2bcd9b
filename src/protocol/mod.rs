//! WebSocket wire protocol (RFC 6455): framing, masking, and the upgrade
//! handshake.

pub(crate) mod frame;
pub mod handshake;
pub mod mask;
pub mod opcode;

pub(crate) use frame::{Gather, GatheredMessage, encode_frame, gather_message};
pub(crate) use handshake::{build_request, find_terminator, generate_key, validate_response};
pub use handshake::{WEBSOCKET_GUID, compute_accept_key};
pub use mask::apply_mask;
pub use opcode::OpCode;
