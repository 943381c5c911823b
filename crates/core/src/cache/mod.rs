//! Set-Associative Cache Level.
//!
//! This module implements one level of the simulated hierarchy. A level owns:
//! 1. **Storage:** `sets × ways` line slots, stored flat and indexed `set * ways + way`.
//! 2. **Replacement:** A pluggable victim policy consulted only for full sets.
//! 3. **Statistics:** LOAD, STORE, HIT, MISS and EVICT counters.
//!
//! A level never talks to its neighbours. [`CacheLevel::access`] reports what
//! happened to a single-line access, and the owning
//! [`CacheHierarchy`](crate::hierarchy::CacheHierarchy) decides what to forward.

/// Cache replacement policy implementations (LRU, FIFO, MRU, PLRU, Random).
pub mod policies;

use std::fmt;

use tracing::trace;

use self::policies::ReplacementPolicy;
use crate::common::addr::{LineChunk, LineGeometry};
use crate::common::data::AccessKind;
use crate::common::error::BuildError;
use crate::config::LevelConfig;
use crate::stats::LevelStats;

/// One line slot: tag, validity, and dirty bits.
///
/// Recency metadata lives in the level's replacement policy, keyed by the
/// same `(set, way)` position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// Line index divided by the set count.
    pub tag: u64,
    /// Slot holds a line.
    pub valid: bool,
    /// Line was written since it was filled.
    pub dirty: bool,
}

/// A line pushed out of a full set to make room for a fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eviction {
    /// Base address of the evicted line.
    pub addr: u64,
    /// The evicted line was dirty and must be written back.
    pub dirty: bool,
}

/// Result of a single-line access at one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineOutcome {
    /// The line was present.
    pub hit: bool,
    /// Line displaced by the fill, if the set was full.
    pub evicted: Option<Eviction>,
}

impl LineOutcome {
    /// Base address of a line that has to be written back, if any.
    pub fn writeback(&self) -> Option<u64> {
        self.evicted.filter(|e| e.dirty).map(|e| e.addr)
    }
}

/// One level of a cache hierarchy.
pub struct CacheLevel {
    name: String,
    geometry: LineGeometry,
    ways: usize,
    lines: Vec<CacheLine>,
    policy: Box<dyn ReplacementPolicy + Send>,
    stats: LevelStats,
}

impl CacheLevel {
    /// Creates an empty level from its description.
    ///
    /// # Arguments
    ///
    /// * `config` - Level name, geometry, and replacement policy.
    ///
    /// # Errors
    ///
    /// Any [`BuildError`] raised by [`LevelConfig::validate`].
    pub fn new(config: &LevelConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let policy = policies::build(config.policy, config.sets as usize, config.ways);
        Ok(Self::assemble(config, policy))
    }

    /// Creates an empty level that uses a caller-supplied replacement policy.
    ///
    /// The `policy` field of `config` is ignored, and so is the PLRU geometry rule.
    ///
    /// # Errors
    ///
    /// [`BuildError`] for an invalid line size, set count, or associativity.
    pub fn with_policy(
        config: &LevelConfig,
        policy: Box<dyn ReplacementPolicy + Send>,
    ) -> Result<Self, BuildError> {
        LevelConfig {
            policy: crate::config::ReplacementPolicy::Lru,
            ..config.clone()
        }
        .validate()?;
        Ok(Self::assemble(config, policy))
    }

    fn assemble(config: &LevelConfig, policy: Box<dyn ReplacementPolicy + Send>) -> Self {
        Self {
            name: config.name.clone(),
            geometry: LineGeometry::new(config.line_bytes, config.sets),
            ways: config.ways,
            lines: vec![CacheLine::default(); config.sets as usize * config.ways],
            policy,
            stats: LevelStats::default(),
        }
    }

    /// Level name used in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line size and set count.
    pub fn geometry(&self) -> LineGeometry {
        self.geometry
    }

    /// Associativity.
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Counters accumulated since construction or the last reset.
    pub fn stats(&self) -> &LevelStats {
        &self.stats
    }

    /// Zeroes every counter; line contents are kept.
    pub fn reset_stats(&mut self) {
        self.stats = LevelStats::default();
    }

    /// Slots of one set, indexed by way.
    ///
    /// # Panics
    ///
    /// Panics if `set` is not below the set count.
    pub fn set(&self, set: usize) -> &[CacheLine] {
        let base = set * self.ways;
        &self.lines[base..base + self.ways]
    }

    /// Number of valid lines in the level.
    pub fn valid_lines(&self) -> usize {
        self.lines.iter().filter(|l| l.valid).count()
    }

    /// Number of valid dirty lines in the level.
    pub fn dirty_lines(&self) -> usize {
        self.lines.iter().filter(|l| l.valid && l.dirty).count()
    }

    /// Checks if the level holds the line containing `addr`.
    ///
    /// Pure lookup: no counters change and replacement state is untouched.
    pub fn contains(&self, addr: u64) -> bool {
        self.find(self.geometry.set_index(addr), self.geometry.tag(addr))
            .is_some()
    }

    fn find(&self, set: usize, tag: u64) -> Option<usize> {
        self.set(set).iter().position(|l| l.valid && l.tag == tag)
    }

    /// Simulates one access that lies inside a single line.
    ///
    /// Charges LOAD or STORE, then HIT or MISS, by one event and `chunk.size`
    /// bytes. A hit refreshes the line's recency and, for a dirty store, marks
    /// it dirty. A miss installs the line in the lowest free way or, if the set
    /// is full, in the policy's victim way (charging EVICT by one line). The
    /// installed line's dirty bit is `dirty` for stores and clear for loads.
    ///
    /// Nothing is forwarded from here; the caller acts on the returned outcome.
    ///
    /// # Arguments
    ///
    /// * `chunk` - Address and size, not crossing a line boundary.
    /// * `kind` - Load or store.
    /// * `dirty` - Whether a store leaves the line dirty. Ignored for loads.
    pub fn access(&mut self, chunk: LineChunk, kind: AccessKind, dirty: bool) -> LineOutcome {
        debug_assert!(
            chunk.size > 0
                && self.geometry.line_index(chunk.addr)
                    == self.geometry.line_index(chunk.addr + (chunk.size - 1)),
            "access crosses a line boundary"
        );

        let dirty = kind.is_store() && dirty;
        match kind {
            AccessKind::Load => self.stats.load.record(chunk.size),
            AccessKind::Store => self.stats.store.record(chunk.size),
        }

        let set = self.geometry.set_index(chunk.addr);
        let tag = self.geometry.tag(chunk.addr);
        let base = set * self.ways;

        if let Some(way) = self.find(set, tag) {
            self.stats.hit.record(chunk.size);
            self.policy.touch(set, way);
            if dirty {
                self.lines[base + way].dirty = true;
            }
            return LineOutcome {
                hit: true,
                evicted: None,
            };
        }

        self.stats.miss.record(chunk.size);
        let free = self.set(set).iter().position(|l| !l.valid);
        let (way, evicted) = match free {
            Some(free) => (free, None),
            None => {
                let way = self.policy.victim(set);
                let victim = self.lines[base + way];
                let addr = self.geometry.line_address(victim.tag, set);
                self.stats.evict.record(self.geometry.line_bytes());
                trace!(
                    level = %self.name,
                    set,
                    way,
                    victim = addr,
                    dirty = victim.dirty,
                    "evict"
                );
                let eviction = Eviction {
                    addr,
                    dirty: victim.dirty,
                };
                (way, Some(eviction))
            }
        };

        self.lines[base + way] = CacheLine {
            tag,
            valid: true,
            dirty,
        };
        self.policy.insert(set, way);

        LineOutcome {
            hit: false,
            evicted,
        }
    }

    /// Invalidates every line.
    ///
    /// # Returns
    ///
    /// Base addresses of the lines that were valid and dirty, in slot order.
    pub fn drain(&mut self) -> Vec<u64> {
        let mut dirty = Vec::new();
        for (slot, line) in self.lines.iter_mut().enumerate() {
            if line.valid && line.dirty {
                dirty.push(self.geometry.line_address(line.tag, slot / self.ways));
            }
            *line = CacheLine::default();
        }
        dirty
    }
}

impl fmt::Debug for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheLevel")
            .field("name", &self.name)
            .field("line_bytes", &self.geometry.line_bytes())
            .field("sets", &self.geometry.sets())
            .field("ways", &self.ways)
            .field("valid_lines", &self.valid_lines())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
