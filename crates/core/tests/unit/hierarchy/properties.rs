//! Randomized Counter Invariants.
//!
//! Every level uses 64-byte lines, so each forwarded request is exactly one
//! sub-access at the next level and counts can be compared directly.

use std::collections::HashSet;

use cachesim_core::{CacheHierarchy, StatKind};
use proptest::prelude::*;

use crate::common::harness::{hierarchy, stats};

const GEOMETRY: [(u64, u64, usize); 3] = [(64, 4, 2), (64, 8, 2), (64, 16, 4)];

#[derive(Clone, Copy, Debug)]
struct Op {
    write: bool,
    addr: u64,
    size: u64,
}

fn ops(max: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        (any::<bool>(), 0u64..8192, 1u64..=130).prop_map(|(write, addr, size)| Op {
            write,
            addr,
            size,
        }),
        0..max,
    )
}

fn apply(caches: &mut CacheHierarchy, op: Op) {
    if op.write {
        caches.store(0, op.addr, op.size, true);
    } else {
        caches.load(0, op.addr, op.size);
    }
}

/// Reference LRU level: each set lists `(line, dirty)` oldest first.
struct ModelLevel {
    sets: u64,
    ways: usize,
    lines: Vec<Vec<(u64, bool)>>,
    dirty_evictions: u64,
}

fn model() -> Vec<ModelLevel> {
    GEOMETRY
        .iter()
        .map(|&(_, sets, ways)| ModelLevel {
            sets,
            ways,
            lines: vec![Vec::new(); sets as usize],
            dirty_evictions: 0,
        })
        .collect()
}

fn model_access(levels: &mut [ModelLevel], line: u64, store: bool) {
    let Some((level, below)) = levels.split_first_mut() else {
        return;
    };
    let set = &mut level.lines[(line % level.sets) as usize];
    if let Some(pos) = set.iter().position(|&(l, _)| l == line) {
        let (l, dirty) = set.remove(pos);
        set.push((l, dirty || store));
        return;
    }
    if set.len() == level.ways {
        let (victim, dirty) = set.remove(0);
        set.push((line, store));
        if dirty {
            level.dirty_evictions += 1;
            model_access(below, victim, true);
        }
    } else {
        set.push((line, store));
    }
    model_access(below, line, false);
}

fn run_model(ops: &[Op]) -> Vec<ModelLevel> {
    let mut levels = model();
    for op in ops {
        for line in op.addr / 64..=(op.addr + op.size - 1) / 64 {
            model_access(&mut levels, line, op.write);
        }
    }
    levels
}

fn run(ops: &[Op]) -> CacheHierarchy {
    let mut caches = hierarchy(&GEOMETRY);
    for &op in ops {
        apply(&mut caches, op);
    }
    caches
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Each access at level i+1 is a fill for one miss or a write-back for one
    /// dirty eviction at level i.
    #[test]
    fn forwarded_traffic_matches_misses_and_evictions(ops in ops(300)) {
        let caches = run(&ops);
        let reference = run_model(&ops);
        for i in 0..GEOMETRY.len() - 1 {
            let upper = stats(&caches, i);
            let lower = stats(&caches, i + 1);
            prop_assert_eq!(lower.load().count, upper.miss().count);
            prop_assert_eq!(lower.store().count, reference[i].dirty_evictions);
            prop_assert!(lower.store().count <= upper.evict().count);
            prop_assert_eq!(lower.load().bytes, 64 * upper.miss().count);
            prop_assert_eq!(lower.store().bytes, 64 * reference[i].dirty_evictions);
        }
    }

    #[test]
    fn lru_levels_agree_with_reference(ops in ops(300)) {
        let caches = run(&ops);
        let reference = run_model(&ops);
        for (i, expected) in reference.iter().enumerate() {
            let level = caches.level(i).unwrap();
            let dirty = expected.lines.iter().flatten().filter(|&&(_, d)| d).count();
            let valid = expected.lines.iter().map(Vec::len).sum::<usize>();
            prop_assert_eq!(level.dirty_lines(), dirty);
            prop_assert_eq!(level.valid_lines(), valid);
            for &(line, _) in expected.lines.iter().flatten() {
                prop_assert!(level.contains(line * 64), "L{} lost line {}", i + 1, line);
            }
        }
    }

    #[test]
    fn every_access_is_a_hit_or_a_miss(ops in ops(300)) {
        let caches = run(&ops);
        for i in 0..GEOMETRY.len() {
            let s = stats(&caches, i);
            prop_assert_eq!(s.hit().count + s.miss().count, s.load().count + s.store().count);
            prop_assert_eq!(s.hit().bytes + s.miss().bytes, s.load().bytes + s.store().bytes);
            prop_assert_eq!(s.evict().bytes, 64 * s.evict().count);
        }
    }

    #[test]
    fn top_level_bytes_match_the_stream(ops in ops(300)) {
        let caches = run(&ops);
        let written: u64 = ops.iter().filter(|o| o.write).map(|o| o.size).sum();
        let read: u64 = ops.iter().filter(|o| !o.write).map(|o| o.size).sum();
        let top = stats(&caches, 0);
        prop_assert_eq!(top.store().bytes, written);
        prop_assert_eq!(top.load().bytes, read);
    }

    /// Lines are never invalidated without a flush, so every miss either
    /// filled a free way or replaced a victim.
    #[test]
    fn evictions_only_from_full_sets(ops in ops(300)) {
        let caches = run(&ops);
        for (i, level) in caches.levels().iter().enumerate() {
            let s = stats(&caches, i);
            let valid = level.valid_lines() as u64;
            prop_assert_eq!(valid, s.miss().count - s.evict().count);
            prop_assert!(level.valid_lines() <= level.geometry().sets() as usize * level.ways());
        }
    }

    #[test]
    fn valid_tags_are_unique_per_set(ops in ops(300)) {
        let caches = run(&ops);
        for level in caches.levels() {
            for set in 0..level.geometry().sets() as usize {
                let mut seen = HashSet::new();
                for line in level.set(set).iter().filter(|l| l.valid) {
                    prop_assert!(seen.insert(line.tag), "duplicate tag {} in set {}", line.tag, set);
                }
            }
        }
    }

    #[test]
    fn counters_never_decrease(ops in ops(150)) {
        let mut caches = hierarchy(&GEOMETRY);
        let mut previous: Vec<_> = (0..GEOMETRY.len()).map(|i| stats(&caches, i)).collect();
        for &op in &ops {
            apply(&mut caches, op);
            for (i, before) in previous.iter_mut().enumerate() {
                let now = stats(&caches, i);
                for kind in StatKind::ALL {
                    prop_assert!(now.get(kind).count >= before.get(kind).count);
                    prop_assert!(now.get(kind).bytes >= before.get(kind).bytes);
                }
                *before = now;
            }
        }
    }

    #[test]
    fn read_only_streams_never_store(ops in ops(300)) {
        let reads: Vec<_> = ops.into_iter().map(|o| Op { write: false, ..o }).collect();
        let caches = run(&reads);
        for i in 0..GEOMETRY.len() {
            prop_assert_eq!(stats(&caches, i).store().count, 0);
            prop_assert_eq!(caches.level(i).map(|l| l.dirty_lines()), Some(0));
        }
    }
}
