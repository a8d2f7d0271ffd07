//! Random number generator abstraction for determinism.
//!
//! In production, this wraps the thread-local RNG. In tests a seeded or
//! sequenced implementation is injected so issued tokens are predictable.

use rand::Rng;

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;
}

/// Production RNG backed by `rand::rng()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRng;

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        rand::rng().random_range(min..=max)
    }
}

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draws an alphanumeric token of `len` characters from `rng`.
pub fn alphanumeric_token(rng: &mut dyn DeterministicRng, len: usize) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let max = (TOKEN_ALPHABET.len() - 1) as u32;
    (0..len)
        .map(|_| {
            let index = rng.next_u32_range(0, max) as usize;
            char::from(TOKEN_ALPHABET[index.min(TOKEN_ALPHABET.len() - 1)])
        })
        .collect()
}
