//! Trace-driven cache hierarchy simulator library.
//!
//! This crate replays memory accesses through a chain of set-associative
//! cache levels and counts what happens at each one:
//! 1. **Cache:** Per-level line storage, tag lookup, and replacement policies (LRU by default).
//! 2. **Hierarchy:** Construction from validated descriptions, miss and write-back propagation.
//! 3. **Statistics:** LOAD / STORE / HIT / MISS / EVICT counters with byte totals, and reports.
//! 4. **Configuration:** Level descriptions from JSON or the `cachedef` text form.
//! 5. **Simulation:** Trace replay with optional activation windows.
//!
//! # Example
//!
//! ```
//! use cachesim_core::{CacheHierarchy, HierarchyConfig, LevelConfig};
//!
//! let config = HierarchyConfig::new(vec![
//!     LevelConfig::new("L1", 64, 64, 8),
//!     LevelConfig::new("L2", 64, 1024, 16),
//! ]);
//! let mut caches = CacheHierarchy::build(&config)?;
//!
//! caches.load(0, 0x1000, 8);
//! caches.load(0, 0x1000, 8);
//! caches.store(0, 0x1004, 4, true);
//!
//! let report = caches.report();
//! assert_eq!(report.levels[0].stats.hit().count, 2);
//! assert_eq!(report.levels[1].stats.load().count, 1);
//! # Ok::<(), cachesim_core::BuildError>(())
//! ```

/// Set-associative cache level and replacement policies.
pub mod cache;
/// Common types (line geometry, access kinds, errors).
pub mod common;
/// Hierarchy descriptions, defaults, loaders, and validation.
pub mod config;
/// The multi-level simulator: construction, load/store, flush, reporting.
pub mod hierarchy;
/// Access-event sources (trace replay).
pub mod sim;
/// Statistics counters and reports.
pub mod stats;

/// One simulated cache level.
pub use crate::cache::CacheLevel;
/// Construction, configuration, and trace errors.
pub use crate::common::error::{BuildError, ConfigError, TraceError};
/// Hierarchy and level descriptions; deserialize from JSON or parse a cachedef file.
pub use crate::config::{HierarchyConfig, LevelConfig, ReplacementPolicy};
/// The simulator; build with `CacheHierarchy::build`.
pub use crate::hierarchy::CacheHierarchy;
/// Trace replay entry point.
pub use crate::sim::TraceReplayer;
/// Report types.
pub use crate::stats::{HierarchyReport, LevelStats, StatCounter, StatKind};
