//! Randomness behind an injectable source.
//!
//! Handshake keys and per-frame mask keys both come from a [`RandomSource`],
//! so tests can substitute a deterministic generator and production code uses
//! the operating system's entropy.

/// Source of random bytes for handshake keys and mask keys.
pub trait RandomSource {
    /// Fill `buf` with random bytes.
    fn fill(&mut self, buf: &mut [u8]);
}

/// Operating-system randomness.
///
/// Falls back to a time-seeded mixer if `getrandom` fails; mask keys degrade
/// to obfuscation quality in that case, which is all RFC 6455 asks of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn fill(&mut self, buf: &mut [u8]) {
        if getrandom::getrandom(buf).is_ok() {
            return;
        }
        // Fallback to system time
        use std::time::{SystemTime, UNIX_EPOCH};
        let mut seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u32)
            .unwrap_or(0x12345678);
        for byte in buf.iter_mut() {
            seed = seed.wrapping_add(0x9E37_79B9);
            let mixed = (seed ^ (seed >> 16)).wrapping_mul(0x85EB_CA6B);
            *byte = (mixed >> 24) as u8;
        }
    }
}
