//! Random Replacement Policy.
//!
//! This policy evicts a pseudo-random way of the set. It uses a xorshift64
//! generator with a fixed seed so that a given trace always produces the same
//! statistics.

use super::ReplacementPolicy;

/// Seed used by [`RandomPolicy::new`].
pub const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Random Policy state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    /// Number of ways in the cache.
    ways: usize,
    /// Generator state; never zero.
    state: u64,
}

impl RandomPolicy {
    /// Creates a new Random policy instance with [`DEFAULT_SEED`].
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets (unused in this policy but required by interface).
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(_sets: usize, ways: usize) -> Self {
        Self::with_seed(ways, DEFAULT_SEED)
    }

    /// Creates a Random policy with an explicit seed. A zero seed is replaced by [`DEFAULT_SEED`].
    pub fn with_seed(ways: usize, seed: u64) -> Self {
        Self {
            ways,
            state: if seed == 0 { DEFAULT_SEED } else { seed },
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn touch(&mut self, _set: usize, _way: usize) {}

    fn insert(&mut self, _set: usize, _way: usize) {}

    fn victim(&mut self, _set: usize) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % self.ways as u64) as usize
    }
}
