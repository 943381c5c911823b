//! Simulation statistics collection and reporting.
//!
//! This module tracks per-level event counters. It provides:
//! 1. **Counters:** `StatCounter`, an event count paired with a byte total.
//! 2. **Per-level stats:** LOAD, STORE, HIT, MISS and EVICT counters plus derived ratios.
//! 3. **Reports:** A top-to-bottom snapshot of every level, printable as text or serializable as JSON.
//!
//! Counters only ever grow while a hierarchy runs; the only way to lower them
//! is an explicit reset.

use std::fmt;

use serde::Serialize;

/// Running totals for one event class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatCounter {
    /// Number of events.
    pub count: u64,
    /// Bytes covered by those events.
    pub bytes: u64,
}

impl StatCounter {
    /// Adds one event covering `bytes` bytes.
    #[inline]
    pub(crate) fn record(&mut self, bytes: u64) {
        self.count += 1;
        self.bytes += bytes;
    }
}

/// The five event classes tracked at every level, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatKind {
    /// Read sub-accesses routed to the level (including fills from above).
    Load,
    /// Write sub-accesses routed to the level (including write-backs from above).
    Store,
    /// Sub-accesses that found their line.
    Hit,
    /// Sub-accesses that did not.
    Miss,
    /// Valid lines displaced by a fill; bytes are whole lines.
    Evict,
}

impl StatKind {
    /// Every kind in report order.
    pub const ALL: [Self; 5] = [Self::Load, Self::Store, Self::Hit, Self::Miss, Self::Evict];

    /// Label used in the text report.
    pub fn label(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Evict => "EVICT",
        }
    }
}

/// Counters of one cache level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LevelStats {
    pub(crate) load: StatCounter,
    pub(crate) store: StatCounter,
    pub(crate) hit: StatCounter,
    pub(crate) miss: StatCounter,
    pub(crate) evict: StatCounter,
}

impl LevelStats {
    /// Returns the counter for `kind`.
    pub fn get(&self, kind: StatKind) -> StatCounter {
        match kind {
            StatKind::Load => self.load,
            StatKind::Store => self.store,
            StatKind::Hit => self.hit,
            StatKind::Miss => self.miss,
            StatKind::Evict => self.evict,
        }
    }

    /// LOAD counter.
    pub fn load(&self) -> StatCounter {
        self.load
    }

    /// STORE counter.
    pub fn store(&self) -> StatCounter {
        self.store
    }

    /// HIT counter.
    pub fn hit(&self) -> StatCounter {
        self.hit
    }

    /// MISS counter.
    pub fn miss(&self) -> StatCounter {
        self.miss
    }

    /// EVICT counter.
    pub fn evict(&self) -> StatCounter {
        self.evict
    }

    /// Number of lookups (`HIT + MISS`, equal to `LOAD + STORE`).
    pub fn lookups(&self) -> u64 {
        self.hit.count + self.miss.count
    }

    /// Fraction of lookups that hit, or `0.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            n => self.hit.count as f64 / n as f64,
        }
    }

    /// Fraction of lookups that missed, or `0.0` before the first lookup.
    pub fn miss_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            n => self.miss.count as f64 / n as f64,
        }
    }
}

/// Snapshot of one level's counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelReport {
    /// Level name.
    pub name: String,
    /// Counters at snapshot time.
    pub stats: LevelStats,
}

/// Snapshot of a hierarchy, top level first.
///
/// The `Display` form prints one block per level:
///
/// ```text
/// L1
/// LOAD: 2 size: 8B
/// STORE: 0 size: 0B
/// HIT: 1 size: 4B
/// MISS: 1 size: 4B
/// EVICT: 0 size: 0B
///
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyReport {
    /// One entry per level.
    pub levels: Vec<LevelReport>,
}

impl HierarchyReport {
    /// Looks up a level by name.
    pub fn level(&self, name: &str) -> Option<&LevelReport> {
        self.levels.iter().find(|l| l.name == name)
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Only if serialization itself fails, which plain counters never do.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Prints the text report to stdout.
    pub fn print(&self) {
        print!("{self}");
    }
}

impl fmt::Display for LevelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for kind in StatKind::ALL {
            let counter = self.stats.get(kind);
            writeln!(
                f,
                "{}: {} size: {}B",
                kind.label(),
                counter.count,
                counter.bytes
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for HierarchyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in &self.levels {
            writeln!(f, "{level}")?;
        }
        Ok(())
    }
}
