/// Tracked-set registry.
///
/// Two sets of non-owning entity handles (walls, vents) kept current by
/// lifecycle notifications, with a full-map rescan used at map load and
/// as a fallback when a set is found empty at draw time.

use rustc_hash::FxHashMap;
use crate::classifier;
use crate::host::{EntityDesc, EntityId, MapView};

/// A set of entity handles remembering registration order.
///
/// Each handle carries the sequence number it was first inserted with, so
/// consumers can break ties deterministically. Re-inserting a present
/// handle keeps its original sequence number.
#[derive(Debug, Default, Clone)]
pub struct TrackedSet {
    entries: FxHashMap<EntityId, u64>,
    next_seq: u64,
}

impl TrackedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a handle. Returns false if it was already present.
    pub fn insert(&mut self, id: EntityId) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, self.next_seq);
        self.next_seq += 1;
        true
    }

    /// Remove a handle. Returns false if it was not present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Registration sequence number of a tracked handle
    pub fn sequence(&self, id: EntityId) -> Option<u64> {
        self.entries.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Handles in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.keys().copied()
    }

    /// Handles paired with their registration sequence numbers
    pub fn iter_with_sequence(&self) -> impl Iterator<Item = (EntityId, u64)> + '_ {
        self.entries.iter().map(|(&id, &seq)| (id, seq))
    }

    /// Replace the contents with every entity on `map` accepted by `predicate`
    fn refill(&mut self, map: &dyn MapView, predicate: fn(&EntityDesc) -> bool) -> usize {
        self.clear();
        for desc in map.all_entities() {
            if predicate(desc) {
                self.insert(desc.id);
            }
        }
        self.len()
    }
}

/// Wall and vent sets of one map
#[derive(Debug, Default, Clone)]
pub struct TrackedSets {
    walls: TrackedSet,
    vents: TrackedSet,
}

impl TrackedSets {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== REGISTRATION =====

    /// Track a wall. Idempotent.
    pub fn register_wall(&mut self, id: EntityId) -> bool {
        self.walls.insert(id)
    }

    /// Stop tracking a wall. Idempotent.
    pub fn unregister_wall(&mut self, id: EntityId) -> bool {
        self.walls.remove(id)
    }

    /// Track a vent or cooler. Idempotent.
    pub fn register_vent(&mut self, id: EntityId) -> bool {
        self.vents.insert(id)
    }

    /// Stop tracking a vent or cooler. Idempotent.
    pub fn unregister_vent(&mut self, id: EntityId) -> bool {
        self.vents.remove(id)
    }

    // ===== FULL SCANS =====

    /// Rebuild the wall set from every entity on the map. O(entities).
    pub fn refresh_walls(&mut self, map: &dyn MapView) -> usize {
        self.walls.refill(map, classifier::is_wall_like)
    }

    /// Rebuild the vent set from every entity on the map. O(entities).
    pub fn refresh_vents(&mut self, map: &dyn MapView) -> usize {
        self.vents.refill(map, classifier::is_vent_or_cooler)
    }

    // ===== ACCESS =====

    pub fn walls(&self) -> &TrackedSet {
        &self.walls
    }

    pub fn vents(&self) -> &TrackedSet {
        &self.vents
    }

    /// Remove a batch of walls collected during a scan
    pub fn prune_walls(&mut self, ids: &[EntityId]) {
        for &id in ids {
            self.walls.remove(id);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
