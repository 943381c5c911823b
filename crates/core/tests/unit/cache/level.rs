//! Cache Level Unit Tests.
//!
//! Verifies a single `CacheLevel` in isolation: hit/miss classification,
//! free-way filling, LRU eviction, dirty tracking, and counter charging.
//! Nothing is forwarded at this layer; eviction details come back in the
//! returned `LineOutcome`.

use cachesim_core::cache::{CacheLevel, Eviction, LineOutcome};
use cachesim_core::common::addr::LineChunk;
use cachesim_core::common::data::AccessKind;
use cachesim_core::{BuildError, LevelConfig, StatCounter};
use rstest::rstest;

// ──────────────────────────────────────────────────────────
// Helper: build a simple test level
// ──────────────────────────────────────────────────────────

/// 2 sets, 2 ways, 64-byte lines, LRU.
///
/// Set index = (addr / 64) % 2
/// Tag       = addr / 128
fn test_level() -> CacheLevel {
    CacheLevel::new(&LevelConfig::new("L1", 64, 2, 2)).unwrap()
}

fn load(level: &mut CacheLevel, addr: u64) -> LineOutcome {
    level.access(LineChunk { addr, size: 4 }, AccessKind::Load, false)
}

fn store(level: &mut CacheLevel, addr: u64, dirty: bool) -> LineOutcome {
    level.access(LineChunk { addr, size: 4 }, AccessKind::Store, dirty)
}

// ══════════════════════════════════════════════════════════
// 1. Cold Miss / Warm Hit
// ══════════════════════════════════════════════════════════

#[test]
fn cold_miss_fills_free_way() {
    let mut level = test_level();
    let outcome = load(&mut level, 0x1000);

    assert!(!outcome.hit);
    assert_eq!(outcome.evicted, None, "free way available, nothing evicted");
    assert!(level.contains(0x1000));

    let stats = level.stats();
    assert_eq!(stats.load(), StatCounter { count: 1, bytes: 4 });
    assert_eq!(stats.miss(), StatCounter { count: 1, bytes: 4 });
    assert_eq!(stats.hit(), StatCounter::default());
    assert_eq!(stats.evict(), StatCounter::default());
}

#[test]
fn second_access_hits() {
    let mut level = test_level();
    let _ = load(&mut level, 0x1000);
    let outcome = load(&mut level, 0x1000);

    assert!(outcome.hit);
    assert_eq!(level.stats().hit(), StatCounter { count: 1, bytes: 4 });
    assert_eq!(level.stats().load().count, 2);
}

#[test]
fn same_line_different_offset_hits() {
    let mut level = test_level();
    let _ = load(&mut level, 0x1000);
    assert!(load(&mut level, 0x1000 + 32).hit);
}

#[test]
fn free_ways_fill_lowest_first() {
    let mut level = test_level();
    let _ = load(&mut level, 0);
    let _ = load(&mut level, 128);

    let set = level.set(0);
    assert!(set[0].valid && set[0].tag == 0);
    assert!(set[1].valid && set[1].tag == 1);
    assert_eq!(level.valid_lines(), 2);
}

// ══════════════════════════════════════════════════════════
// 2. Conflict Eviction (LRU)
// ══════════════════════════════════════════════════════════

/// Three addresses in set 0 (tags 0, 1, 2): the third evicts the least
/// recently used of the first two.
#[test]
fn set_conflict_evicts_lru() {
    let mut level = test_level();
    let _ = load(&mut level, 0);
    let _ = load(&mut level, 128);

    let outcome = load(&mut level, 256);
    assert!(!outcome.hit);
    assert_eq!(
        outcome.evicted,
        Some(Eviction {
            addr: 0,
            dirty: false
        })
    );
    assert!(!level.contains(0));
    assert!(level.contains(128));
    assert!(level.contains(256));
    assert_eq!(level.stats().evict(), StatCounter { count: 1, bytes: 64 });
}

#[test]
fn hit_refreshes_recency() {
    let mut level = test_level();
    let _ = load(&mut level, 0);
    let _ = load(&mut level, 128);
    let _ = load(&mut level, 0);

    let outcome = load(&mut level, 256);
    assert_eq!(outcome.evicted.map(|e| e.addr), Some(128));
    assert!(level.contains(0));
}

#[test]
fn other_set_unaffected_by_conflict() {
    let mut level = test_level();
    let _ = load(&mut level, 64);
    let _ = load(&mut level, 0);
    let _ = load(&mut level, 128);
    let _ = load(&mut level, 256);
    assert!(level.contains(64), "set 1 line must survive set 0 conflicts");
}

/// Eviction address is rebuilt from tag and set, not the access offset.
#[test]
fn eviction_reports_line_base() {
    let mut level = test_level();
    let _ = load(&mut level, 64 + 17);
    let _ = load(&mut level, 128 + 64);
    let outcome = load(&mut level, 256 + 64);
    assert_eq!(outcome.evicted.map(|e| e.addr), Some(64));
}

// ══════════════════════════════════════════════════════════
// 3. Dirty Tracking
// ══════════════════════════════════════════════════════════

#[test]
fn dirty_store_miss_installs_dirty_line() {
    let mut level = test_level();
    let outcome = store(&mut level, 0, true);

    assert!(!outcome.hit);
    assert!(level.set(0)[0].dirty);
    assert_eq!(level.stats().store(), StatCounter { count: 1, bytes: 4 });
    assert_eq!(level.stats().load(), StatCounter::default());
}

#[test]
fn clean_store_miss_installs_clean_line() {
    let mut level = test_level();
    let _ = store(&mut level, 0, false);
    assert!(!level.set(0)[0].dirty);
}

#[test]
fn dirty_store_hit_only_sets_dirty() {
    let mut level = test_level();
    let _ = load(&mut level, 0);
    let outcome = store(&mut level, 0, true);

    assert!(outcome.hit);
    assert_eq!(outcome.evicted, None);
    assert!(level.set(0)[0].dirty);
    assert_eq!(level.stats().evict().count, 0);
}

#[test]
fn clean_store_never_cleans_a_dirty_line() {
    let mut level = test_level();
    let _ = store(&mut level, 0, true);
    let _ = store(&mut level, 0, false);
    let _ = load(&mut level, 0);
    assert!(level.set(0)[0].dirty);
    assert_eq!(level.dirty_lines(), 1);
}

#[test]
fn evicting_dirty_line_requests_writeback() {
    let mut level = test_level();
    let _ = store(&mut level, 0, true);
    let _ = load(&mut level, 128);

    let outcome = load(&mut level, 256);
    assert_eq!(
        outcome.evicted,
        Some(Eviction {
            addr: 0,
            dirty: true
        })
    );
    assert_eq!(outcome.writeback(), Some(0));
    assert!(!level.set(0)[0].dirty, "refilled slot holds a clean line");
}

#[test]
fn evicting_clean_line_needs_no_writeback() {
    let mut level = test_level();
    let _ = load(&mut level, 0);
    let _ = load(&mut level, 128);
    let outcome = load(&mut level, 256);
    assert!(outcome.evicted.is_some());
    assert_eq!(outcome.writeback(), None);
}

// ══════════════════════════════════════════════════════════
// 4. Direct-Mapped
// ══════════════════════════════════════════════════════════

#[test]
fn direct_mapped_always_replaces_only_way() {
    let mut level = CacheLevel::new(&LevelConfig::new("DM", 64, 1, 1)).unwrap();
    let _ = load(&mut level, 0);
    for i in 1..10u64 {
        let outcome = load(&mut level, (i % 2) * 64);
        assert!(!outcome.hit);
        assert_eq!(outcome.evicted.map(|e| e.addr), Some(((i + 1) % 2) * 64));
    }
    assert_eq!(level.stats().evict().count, 9);
}

// ══════════════════════════════════════════════════════════
// 5. Inspection and Drain
// ══════════════════════════════════════════════════════════

#[test]
fn contains_does_not_count() {
    let mut level = test_level();
    let _ = load(&mut level, 0);
    let before = *level.stats();
    assert!(level.contains(0));
    assert!(!level.contains(128));
    assert_eq!(*level.stats(), before);
}

#[test]
fn drain_returns_dirty_lines_and_invalidates() {
    let mut level = test_level();
    let _ = store(&mut level, 0, true);
    let _ = load(&mut level, 64);
    let _ = store(&mut level, 128 + 64, true);

    let dirty = level.drain();
    assert_eq!(dirty, vec![0, 192]);
    assert_eq!(level.valid_lines(), 0);
    assert_eq!(level.dirty_lines(), 0);
    assert_eq!(level.stats().store().count, 2, "drain leaves counters alone");
}

#[test]
fn reset_stats_keeps_lines() {
    let mut level = test_level();
    let _ = load(&mut level, 0);
    level.reset_stats();
    assert_eq!(level.stats().load().count, 0);
    assert!(level.contains(0));
}

#[test]
fn accessors_report_geometry() {
    let level = test_level();
    assert_eq!(level.name(), "L1");
    assert_eq!(level.ways(), 2);
    assert_eq!(level.geometry().line_bytes(), 64);
    assert_eq!(level.geometry().sets(), 2);
    assert!(format!("{level:?}").contains("L1"));
}

// ══════════════════════════════════════════════════════════
// 6. Construction
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(LevelConfig::new("X", 48, 4, 2), "line")]
#[case(LevelConfig::new("X", 0, 4, 2), "line")]
#[case(LevelConfig::new("X", 64, 3, 2), "sets")]
#[case(LevelConfig::new("X", 64, 0, 2), "sets")]
#[case(LevelConfig::new("X", 64, 4, 0), "ways")]
fn invalid_geometry_is_rejected(#[case] config: LevelConfig, #[case] field: &str) {
    let err = CacheLevel::new(&config).unwrap_err();
    match field {
        "line" => assert!(matches!(err, BuildError::LineSizeNotPowerOfTwo { .. })),
        "sets" => assert!(matches!(err, BuildError::SetCountNotPowerOfTwo { .. })),
        _ => assert_eq!(
            err,
            BuildError::ZeroAssociativity {
                level: "X".to_string()
            }
        ),
    }
}

#[test]
fn non_power_of_two_ways_allowed_for_lru() {
    let mut level = CacheLevel::new(&LevelConfig::new("L1", 64, 1, 3)).unwrap();
    for addr in [0, 64, 128] {
        let _ = load(&mut level, addr);
    }
    let outcome = load(&mut level, 192);
    assert_eq!(outcome.evicted.map(|e| e.addr), Some(0));
}
