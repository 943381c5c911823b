//! Multi-level cache hierarchy.
//!
//! A hierarchy is an ordered chain of [`CacheLevel`]s. Level `i` forwards to
//! level `i + 1`; the last level forwards to the unsimulated backing store,
//! which satisfies everything. It performs:
//! 1. **Construction:** Validates every level description and builds the chain.
//! 2. **Simulation:** `load` / `store` entry points that split accesses into
//!    line-sized pieces and propagate misses and write-backs downward.
//! 3. **Maintenance:** Flushing dirty lines, resetting counters.
//! 4. **Reporting:** Read-only snapshots of every level's counters.
//!
//! # Propagation
//!
//! A miss at level `i` with a successor forwards, in this order:
//! 1. a dirty store of one line at the victim's address, if a dirty line was evicted;
//! 2. a load of one line at the missing line's address (the fill).
//!
//! Each forwarded request runs to completion, including everything it forwards
//! itself, before the next one starts. The chain is walked with an explicit
//! work stack, so hierarchy depth never grows the call stack.
//! An access spanning several lines keeps a single pending remainder, so the
//! stack stays proportional to depth whatever the access size.

use tracing::{debug, trace};

use crate::cache::{CacheLevel, LineOutcome};
use crate::common::data::AccessKind;
use crate::common::error::BuildError;
use crate::config::HierarchyConfig;
use crate::stats::{HierarchyReport, LevelReport};

/// A pending access against one level.
#[derive(Clone, Copy, Debug)]
struct Request {
    level: usize,
    addr: u64,
    size: u64,
    kind: AccessKind,
    dirty: bool,
}

/// A chain of cache levels, top (closest to the access source) first.
#[derive(Debug)]
pub struct CacheHierarchy {
    levels: Vec<CacheLevel>,
}

impl CacheHierarchy {
    /// Builds an empty hierarchy from a description.
    ///
    /// # Errors
    ///
    /// [`BuildError`] if the description has no levels or any level geometry
    /// is invalid. Nothing is built in that case.
    pub fn build(config: &HierarchyConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let levels = config
            .levels
            .iter()
            .map(CacheLevel::new)
            .collect::<Result<Vec<_>, _>>()?;
        for level in &levels {
            let geometry = level.geometry();
            debug!(
                level = level.name(),
                line_bytes = geometry.line_bytes(),
                sets = geometry.sets(),
                ways = level.ways(),
                "built cache level"
            );
        }
        Ok(Self { levels })
    }

    /// Chains already-built levels, top first.
    ///
    /// # Errors
    ///
    /// [`BuildError::EmptyHierarchy`] if `levels` is empty.
    pub fn from_levels(levels: Vec<CacheLevel>) -> Result<Self, BuildError> {
        if levels.is_empty() {
            return Err(BuildError::EmptyHierarchy);
        }
        Ok(Self { levels })
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// All levels, top first.
    pub fn levels(&self) -> &[CacheLevel] {
        &self.levels
    }

    /// Level `index`, if it exists.
    pub fn level(&self, index: usize) -> Option<&CacheLevel> {
        self.levels.get(index)
    }

    /// Index of the level named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|l| l.name() == name)
    }

    /// Whether `level` currently holds the line containing `addr`.
    ///
    /// Levels past the end hold nothing.
    pub fn contains(&self, level: usize, addr: u64) -> bool {
        self.levels.get(level).is_some_and(|l| l.contains(addr))
    }

    /// Simulates a read of `[addr, addr + size)` entering the hierarchy at `level`.
    ///
    /// A zero `size` is a no-op. A `level` past the end is absorbed by the
    /// backing store.
    pub fn load(&mut self, level: usize, addr: u64, size: u64) {
        self.run(Request {
            level,
            addr,
            size,
            kind: AccessKind::Load,
            dirty: false,
        });
    }

    /// Simulates a write of `[addr, addr + size)` entering the hierarchy at `level`.
    ///
    /// `dirty` decides whether the written lines become dirty at `level`.
    /// A zero `size` is a no-op. A `level` past the end is absorbed by the
    /// backing store.
    pub fn store(&mut self, level: usize, addr: u64, size: u64, dirty: bool) {
        self.run(Request {
            level,
            addr,
            size,
            kind: AccessKind::Store,
            dirty,
        });
    }

    fn run(&mut self, first: Request) {
        let mut pending = vec![first];

        while let Some(req) = pending.pop() {
            let Some(level) = self.levels.get_mut(req.level) else {
                continue;
            };
            let geometry = level.geometry();

            let Some(chunk) = geometry.split(req.addr, req.size).next() else {
                continue;
            };
            if chunk.size < req.size {
                // Spans several lines: the rest waits under this line and everything it forwards.
                pending.push(Request {
                    addr: chunk.addr.wrapping_add(chunk.size),
                    size: req.size - chunk.size,
                    ..req
                });
            }

            let outcome: LineOutcome = level.access(chunk, req.kind, req.dirty);
            let next = req.level + 1;
            if outcome.hit || next >= self.levels.len() {
                continue;
            }

            let line = geometry.line_bytes();
            pending.push(Request {
                level: next,
                addr: geometry.line_base(chunk.addr),
                size: line,
                kind: AccessKind::Load,
                dirty: false,
            });
            if let Some(victim) = outcome.writeback() {
                trace!(from = req.level, to = next, addr = victim, "write-back");
                pending.push(Request {
                    level: next,
                    addr: victim,
                    size: line,
                    kind: AccessKind::Store,
                    dirty: true,
                });
            }
        }
    }

    /// Writes every dirty line back and empties every level.
    ///
    /// Levels are drained top to bottom. Each dirty line is stored (dirty, one
    /// line) into the next level through the normal access path, so it shows
    /// up in that level's counters. The last level's dirty lines go to the
    /// backing store. Counters of the level being drained are not touched.
    pub fn flush(&mut self) {
        for index in 0..self.levels.len() {
            let line = self.levels[index].geometry().line_bytes();
            let dirty = self.levels[index].drain();
            debug!(
                level = self.levels[index].name(),
                written_back = dirty.len(),
                "flushed level"
            );
            for addr in dirty {
                self.store(index + 1, addr, line, true);
            }
        }
    }

    /// Zeroes every level's counters; line contents are kept.
    pub fn reset_stats(&mut self) {
        for level in &mut self.levels {
            level.reset_stats();
        }
    }

    /// Snapshot of every level's counters, top first.
    pub fn report(&self) -> HierarchyReport {
        self.report_from(0)
    }

    /// Snapshot of `level` and every level below it.
    pub fn report_from(&self, level: usize) -> HierarchyReport {
        HierarchyReport {
            levels: self
                .levels
                .iter()
                .skip(level)
                .map(|l| LevelReport {
                    name: l.name().to_string(),
                    stats: *l.stats(),
                })
                .collect(),
        }
    }

    /// Releases the whole chain, returning the final counters.
    pub fn release(self) -> HierarchyReport {
        let report = self.report();
        debug!(levels = self.levels.len(), "released cache hierarchy");
        report
    }
}
