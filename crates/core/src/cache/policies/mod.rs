//! Cache Replacement Policies.
//!
//! Implements the algorithms that pick a victim way in a full set.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used (default).
//! - `Fifo`: First-In, First-Out.
//! - `Mru`: Most Recently Used.
//! - `Plru`: Pseudo-LRU (tree-based).
//! - `Random`: Pseudo-random selection.
//!
//! A policy is only asked for a victim when every way of the set holds a valid
//! line; free ways are filled lowest index first by the cache level itself.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

/// Most Recently Used replacement policy.
pub mod mru;

/// Pseudo-LRU (tree-based) replacement policy.
pub mod plru;

/// Random replacement policy.
pub mod random;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use plru::PlruPolicy;
pub use random::RandomPolicy;

use crate::config::ReplacementPolicy as PolicyType;

/// Trait for cache replacement policies.
///
/// Defines the interface for recording line usage and selecting victim ways.
pub trait ReplacementPolicy {
    /// Records a hit on `way` of `set`.
    fn touch(&mut self, set: usize, way: usize);

    /// Records that a new line was installed in `way` of `set`.
    fn insert(&mut self, set: usize, way: usize);

    /// Selects the way to evict from a full set.
    ///
    /// # Returns
    ///
    /// A way index in `0..ways`.
    fn victim(&mut self, set: usize) -> usize;
}

/// Instantiates the policy selected by a level description.
///
/// # Arguments
///
/// * `kind` - Policy selected in the configuration.
/// * `sets` - Number of sets in the level.
/// * `ways` - Associativity of the level.
pub fn build(kind: PolicyType, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy + Send> {
    match kind {
        PolicyType::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyType::Fifo => Box::new(FifoPolicy::new(sets, ways)),
        PolicyType::Mru => Box::new(MruPolicy::new(sets, ways)),
        PolicyType::Plru => Box::new(PlruPolicy::new(sets, ways)),
        PolicyType::Random => Box::new(RandomPolicy::new(sets, ways)),
    }
}

/// Per-way ordering keys shared by the stamp-based policies.
///
/// Every stamp is taken from one monotonically increasing clock, so no two
/// ways ever hold the same non-zero key.
#[derive(Debug, Clone)]
pub(crate) struct Stamps {
    keys: Vec<u64>,
    ways: usize,
    clock: u64,
}

impl Stamps {
    pub(crate) fn new(sets: usize, ways: usize) -> Self {
        Self {
            keys: vec![0; sets * ways],
            ways,
            clock: 0,
        }
    }

    /// Gives `way` of `set` the newest key.
    pub(crate) fn stamp(&mut self, set: usize, way: usize) {
        self.clock += 1;
        self.keys[set * self.ways + way] = self.clock;
    }

    /// Keys of one set, indexed by way.
    pub(crate) fn set(&self, set: usize) -> &[u64] {
        let base = set * self.ways;
        &self.keys[base..base + self.ways]
    }

    /// Way with the smallest key; ties go to the lowest way.
    pub(crate) fn oldest(&self, set: usize) -> usize {
        self.set(set)
            .iter()
            .enumerate()
            .min_by_key(|&(_, key)| *key)
            .map_or(0, |(way, _)| way)
    }

    /// Way with the largest key; ties go to the lowest way.
    pub(crate) fn newest(&self, set: usize) -> usize {
        self.set(set)
            .iter()
            .enumerate()
            .min_by_key(|&(_, key)| std::cmp::Reverse(*key))
            .map_or(0, |(way, _)| way)
    }
}
