/// Tests for the tracked-set registry

use super::*;
use crate::host::mock::{MockMap, Spawn};
use crate::host::{Cell, EntityDef, EntityKind, LinkFlags, MapId};
use rustc_hash::FxHashSet;
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

struct Fixture {
    map: MockMap,
    walls: Vec<EntityId>,
    vents: Vec<EntityId>,
    others: Vec<EntityId>,
}

/// Map with 3 walls, 2 vents, a wall blueprint, and a bed
fn fixture() -> Fixture {
    let mut map = MockMap::new(MapId(1), 16, 16);
    let wall = Arc::new(EntityDef::building("Wall").with_link_flags(LinkFlags::WALL));
    let vent = Arc::new(EntityDef::building("Vent"));
    let cooler = Arc::new(EntityDef::building("Cooler"));
    let bed = Arc::new(EntityDef::building("Bed").non_edifice());

    let walls = (0..3)
        .map(|x| map.spawn(Spawn::new(&wall, Cell::new(x, 0))))
        .collect();
    let vents = vec![
        map.spawn(Spawn::new(&vent, Cell::new(0, 1))),
        map.spawn(Spawn::new(&cooler, Cell::new(1, 1))),
    ];
    let others = vec![
        map.spawn(Spawn::new(&wall, Cell::new(5, 5)).kind(EntityKind::Blueprint)),
        map.spawn(Spawn::new(&bed, Cell::new(6, 6))),
    ];

    Fixture { map, walls, vents, others }
}

fn ids(set: &TrackedSet) -> FxHashSet<EntityId> {
    set.iter().collect()
}

// ============================================================================
// Tests: TrackedSet
// ============================================================================

#[test]
fn test_insert_is_idempotent() {
    let f = fixture();
    let mut set = TrackedSet::new();
    assert!(set.insert(f.walls[0]));
    assert!(!set.insert(f.walls[0]));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_remove_missing_is_noop() {
    let f = fixture();
    let mut set = TrackedSet::new();
    assert!(!set.remove(f.walls[0]));
    assert!(set.is_empty());
}

#[test]
fn test_sequence_follows_registration_order() {
    let f = fixture();
    let mut set = TrackedSet::new();
    set.insert(f.walls[2]);
    set.insert(f.walls[0]);
    set.insert(f.walls[1]);
    // Re-insert keeps the original number
    set.insert(f.walls[2]);

    assert!(set.sequence(f.walls[2]).unwrap() < set.sequence(f.walls[0]).unwrap());
    assert!(set.sequence(f.walls[0]).unwrap() < set.sequence(f.walls[1]).unwrap());
    assert!(set.sequence(f.vents[0]).is_none());
}

// ============================================================================
// Tests: Registration
// ============================================================================

#[test]
fn test_register_unregister_round_trip() {
    let f = fixture();
    let mut sets = TrackedSets::new();
    sets.register_wall(f.walls[0]);
    sets.register_vent(f.vents[0]);
    let walls_before = ids(sets.walls());
    let vents_before = ids(sets.vents());

    sets.register_wall(f.walls[1]);
    sets.unregister_wall(f.walls[1]);
    sets.register_vent(f.vents[1]);
    sets.unregister_vent(f.vents[1]);

    assert_eq!(ids(sets.walls()), walls_before);
    assert_eq!(ids(sets.vents()), vents_before);
}

#[test]
fn test_wall_and_vent_sets_are_independent() {
    let f = fixture();
    let mut sets = TrackedSets::new();
    sets.register_wall(f.walls[0]);
    assert!(!sets.unregister_vent(f.walls[0]));
    assert!(sets.walls().contains(f.walls[0]));
}

#[test]
fn test_prune_walls() {
    let f = fixture();
    let mut sets = TrackedSets::new();
    for &w in &f.walls {
        sets.register_wall(w);
    }
    sets.prune_walls(&[f.walls[0], f.walls[2], f.vents[0]]);
    assert_eq!(ids(sets.walls()), [f.walls[1]].into_iter().collect());
}

// ============================================================================
// Tests: Full scans
// ============================================================================

#[test]
fn test_refresh_matches_classifier() {
    let f = fixture();
    let mut sets = TrackedSets::new();

    assert_eq!(sets.refresh_walls(&f.map), 3);
    assert_eq!(sets.refresh_vents(&f.map), 2);

    assert_eq!(ids(sets.walls()), f.walls.iter().copied().collect());
    assert_eq!(ids(sets.vents()), f.vents.iter().copied().collect());
    for &other in &f.others {
        assert!(!sets.walls().contains(other));
        assert!(!sets.vents().contains(other));
    }
    assert_eq!(f.map.full_scan_count(), 2);
}

#[test]
fn test_refresh_discards_stale_entries() {
    let mut f = fixture();
    let mut sets = TrackedSets::new();
    sets.refresh_walls(&f.map);

    f.map.despawn(f.walls[1]);
    // A bed registered by mistake is dropped too
    sets.register_wall(f.others[1]);
    sets.refresh_walls(&f.map);

    assert_eq!(ids(sets.walls()), [f.walls[0], f.walls[2]].into_iter().collect());
}
