//! Pseudo-LRU (PLRU) Replacement Policy.
//!
//! Tree PLRU approximates LRU with `W - 1` decision bits per set, arranged as
//! a complete binary tree over the ways (heap order: node `n` has children
//! `2n + 1` and `2n + 2`). Each bit points toward the half that should be
//! evicted next: `false` = left, `true` = right.
//!
//! On every touch or fill the bits along the path to the used way are set to
//! point away from it. The victim is found by following the bits from the root.
//! Requires a power-of-two associativity; the level configuration rejects
//! anything else.
//!
//! # Performance
//!
//! - **Time Complexity:** O(log W) for `touch()`, `insert()` and `victim()`
//! - **Space Complexity:** S × (W − 1) bits
//! - **Worst Case:** Pathological patterns can evict a line that true LRU would keep

use super::ReplacementPolicy;

/// PLRU Policy state.
#[derive(Debug, Clone)]
pub struct PlruPolicy {
    /// Tree bits, `ways - 1` per set, laid out set after set.
    bits: Vec<bool>,
    ways: usize,
}

impl PlruPolicy {
    /// Creates a new PLRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity; must be a power of two.
    pub fn new(sets: usize, ways: usize) -> Self {
        debug_assert!(ways.is_power_of_two(), "tree PLRU needs power-of-two ways");
        Self {
            bits: vec![false; sets * ways.saturating_sub(1)],
            ways,
        }
    }

    fn tree_mut(&mut self, set: usize) -> &mut [bool] {
        let nodes = self.ways - 1;
        &mut self.bits[set * nodes..(set + 1) * nodes]
    }

    fn point_away(&mut self, set: usize, way: usize) {
        let ways = self.ways;
        let tree = self.tree_mut(set);
        let (mut node, mut lo, mut hi) = (0, 0, ways);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if way < mid {
                tree[node] = true;
                node = 2 * node + 1;
                hi = mid;
            } else {
                tree[node] = false;
                node = 2 * node + 2;
                lo = mid;
            }
        }
    }
}

impl ReplacementPolicy for PlruPolicy {
    fn touch(&mut self, set: usize, way: usize) {
        self.point_away(set, way);
    }

    fn insert(&mut self, set: usize, way: usize) {
        self.point_away(set, way);
    }

    fn victim(&mut self, set: usize) -> usize {
        let ways = self.ways;
        let tree = self.tree_mut(set);
        let (mut node, mut lo, mut hi) = (0, 0, ways);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if tree[node] {
                node = 2 * node + 2;
                lo = mid;
            } else {
                node = 2 * node + 1;
                hi = mid;
            }
        }
        lo
    }
}
