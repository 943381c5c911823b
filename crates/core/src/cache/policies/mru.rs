//! Most Recently Used (MRU) Replacement Policy.
//!
//! This policy evicts the line that was touched or filled most recently.
//! While counter-intuitive for standard workloads, MRU is optimal for
//! cyclic access patterns (loops) where the dataset is larger than the cache:
//! the most recent line is the one needed furthest in the future.

use super::{ReplacementPolicy, Stamps};

/// MRU Policy state.
#[derive(Debug, Clone)]
pub struct MruPolicy {
    recency: Stamps,
}

impl MruPolicy {
    /// Creates a new MRU policy instance.
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

impl ReplacementPolicy for MruPolicy {
    fn touch(&mut self, set: usize, way: usize) {
        self.recency.stamp(set, way);
    }

    fn insert(&mut self, set: usize, way: usize) {
        self.recency.stamp(set, way);
    }

    fn victim(&mut self, set: usize) -> usize {
        self.recency.newest(set)
    }
}
