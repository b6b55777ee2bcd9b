//! XOR masking of outbound frame payloads.
//!
//! Client-to-server payloads are XORed with a 4-byte key, cycling the key
//! every 4 bytes. The operation is its own inverse. Server-to-client frames
//! are never masked; the decoder rejects any that claim to be.

/// Apply (or remove) a 4-byte mask, cycling the key every 4 bytes.
///
/// Works a word at a time over the aligned body and byte-by-byte over the
/// tail; the tail's key index stays correct because the body length is a
/// multiple of 4.
#[inline]
pub fn apply_mask(data: &mut [u8], key: [u8; 4]) {
    let key_word = u32::from_ne_bytes(key);
    let mut chunks = data.chunks_exact_mut(4);
    for chunk in &mut chunks {
        let word = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        chunk.copy_from_slice(&(word ^ key_word).to_ne_bytes());
    }
    for (i, byte) in chunks.into_remainder().iter_mut().enumerate() {
        *byte ^= key[i];
    }
}
