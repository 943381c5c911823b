//! Least Recently Used (LRU) Replacement Policy.
//!
//! Evicts the line that has gone longest without a hit or fill. Each way
//! carries a recency stamp drawn from a per-level clock; the victim is the
//! way with the oldest stamp.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()` / `insert()`: O(1)
//!   - `victim()`: O(W) where W is the number of ways (associativity)
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Best Case:** Working sets that fit in the set, strong temporal locality
//! - **Worst Case:** Cyclic scans larger than the set (every access misses)

use super::{ReplacementPolicy, Stamps};

/// LRU Policy state.
#[derive(Debug, Clone)]
pub struct LruPolicy {
    recency: Stamps,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            recency: Stamps::new(sets, ways),
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    fn touch(&mut self, set: usize, way: usize) {
        self.recency.stamp(set, way);
    }

    fn insert(&mut self, set: usize, way: usize) {
        self.recency.stamp(set, way);
    }

    fn victim(&mut self, set: usize) -> usize {
        self.recency.oldest(set)
    }
}
