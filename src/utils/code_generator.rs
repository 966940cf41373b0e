//! Short ID generation.
//!
//! IDs are fixed-length strings drawn uniformly from a 62-character
//! alphanumeric alphabet. The generator makes no uniqueness guarantee;
//! storage reports a taken ID and the service draws another.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Mutex;

/// Characters a short ID is drawn from.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default short ID length.
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Source of short IDs.
///
/// Implementations must be safe to call from many request handlers at once.
/// An empty string signals a misconfigured generator.
#[cfg_attr(test, mockall::automock)]
pub trait ShortIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random alphanumeric generator seeded once from the OS at construction.
///
/// The RNG is shared behind a mutex so concurrent callers never observe the
/// same internal state.
pub struct RandomShortIdGenerator {
    length: usize,
    rng: Mutex<StdRng>,
}

impl RandomShortIdGenerator {
    /// Creates a generator producing IDs of `length` characters.
    pub fn new(length: usize) -> Self {
        Self::with_rng(length, StdRng::from_os_rng())
    }

    /// Creates a generator with a fixed seed. Useful for reproducible tests.
    pub fn with_seed(length: usize, seed: u64) -> Self {
        Self::with_rng(length, StdRng::seed_from_u64(seed))
    }

    fn with_rng(length: usize, rng: StdRng) -> Self {
        Self {
            length,
            rng: Mutex::new(rng),
        }
    }

    #[cfg(test)]
    pub(crate) fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomShortIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}

impl ShortIdGenerator for RandomShortIdGenerator {
    fn generate(&self) -> String {
        // A poisoned lock still holds a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }
}
