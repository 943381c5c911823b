//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! Evicts the line that was installed earliest, regardless of how often it
//! has hit since. Only fills advance a way's position; hits are ignored.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(1), no state change
//!   - `insert()`: O(1)
//!   - `victim()`: O(W)
//! - **Best Case:** Streaming accesses where all lines have equal importance
//! - **Worst Case:** Workloads with strong temporal locality (hot lines age out)

use super::{ReplacementPolicy, Stamps};

/// FIFO Policy state.
#[derive(Debug, Clone)]
pub struct FifoPolicy {
    installed: Stamps,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            installed: Stamps::new(sets, ways),
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn touch(&mut self, _set: usize, _way: usize) {}

    fn insert(&mut self, set: usize, way: usize) {
        self.installed.stamp(set, way);
    }

    fn victim(&mut self, set: usize) -> usize {
        self.installed.oldest(set)
    }
}
