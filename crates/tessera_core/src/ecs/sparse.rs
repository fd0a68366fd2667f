//! # Sparse Set
//!
//! Maps entity slots to positions in a densely packed array.
//!
//! ```text
//! sparse: [ -, 2, -, 0, 1 ]      slot -> dense position
//! dense:  [ e3, e4, e1 ]         dense position -> entity
//! ```
//!
//! Membership, insertion and removal are O(1). Removal swaps the last dense
//! entry into the freed position so the dense array never has holes; any
//! storage keyed by dense position must mirror that swap exactly.

use super::entity::Entity;

/// Sparse-set index over entity slots.
#[derive(Debug, Default, Clone)]
pub struct SparseSet {
    /// Slot -> dense position. `None` is the nil sentinel.
    sparse: Vec<Option<u32>>,
    /// Dense position -> entity.
    dense: Vec<Entity>,
}

impl SparseSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for `capacity` dense entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::with_capacity(capacity),
        }
    }

    /// Number of entities in the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Whether the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// True iff the slot is in range and holds a dense position.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.position_of(entity).is_some()
    }

    /// Dense position of `entity`, if present.
    #[inline]
    #[must_use]
    pub fn position_of(&self, entity: Entity) -> Option<usize> {
        self.sparse
            .get(entity.slot() as usize)
            .copied()
            .flatten()
            .map(|pos| pos as usize)
    }

    /// Appends `entity` to the dense array and records its position.
    ///
    /// Returns the new dense position. The caller must check
    /// [`contains`](Self::contains) first.
    pub fn insert(&mut self, entity: Entity) -> usize {
        debug_assert!(!entity.is_null(), "nil entity inserted into sparse set");
        debug_assert!(!self.contains(entity), "entity already in sparse set");

        let slot = entity.slot() as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, None);
        }

        let pos = self.dense.len();
        self.sparse[slot] = Some(pos as u32);
        self.dense.push(entity);
        pos
    }

    /// Removes `entity`, returning the dense position it vacated.
    ///
    /// The last dense entry is moved into that position and its sparse entry
    /// updated. Returns `None` if the entity was not present.
    pub fn remove(&mut self, entity: Entity) -> Option<usize> {
        let pos = self.position_of(entity)?;

        let last = self.dense.len() - 1;
        if pos != last {
            let moved = self.dense[last];
            self.dense[pos] = moved;
            self.sparse[moved.slot() as usize] = Some(pos as u32);
        }
        self.dense.pop();
        self.sparse[entity.slot() as usize] = None;

        Some(pos)
    }

    /// Entity stored at a dense position.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, pos: usize) -> Option<Entity> {
        self.dense.get(pos).copied()
    }

    /// The dense entity array.
    #[inline]
    #[must_use]
    pub fn dense(&self) -> &[Entity] {
        &self.dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::entity::EntityKind;

    fn e(slot: u32) -> Entity {
        Entity::new(slot, 0, EntityKind::Normal)
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = SparseSet::new();
        assert!(!set.contains(e(5)));

        assert_eq!(set.insert(e(5)), 0);
        assert_eq!(set.insert(e(1)), 1);

        assert!(set.contains(e(5)));
        assert!(set.contains(e(1)));
        assert!(!set.contains(e(0)));
        assert!(!set.contains(e(100)));
        assert_eq!(set.position_of(e(1)), Some(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_swaps_last_into_hole() {
        let mut set = SparseSet::new();
        for slot in [3, 7, 9] {
            set.insert(e(slot));
        }

        assert_eq!(set.remove(e(3)), Some(0));
        assert_eq!(set.dense(), &[e(9), e(7)]);
        assert_eq!(set.position_of(e(9)), Some(0));
        assert_eq!(set.position_of(e(7)), Some(1));
        assert!(!set.contains(e(3)));
    }

    #[test]
    fn test_remove_last() {
        let mut set = SparseSet::new();
        set.insert(e(2));
        set.insert(e(4));

        assert_eq!(set.remove(e(4)), Some(1));
        assert_eq!(set.dense(), &[e(2)]);
        assert_eq!(set.remove(e(2)), Some(0));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_missing() {
        let mut set = SparseSet::new();
        set.insert(e(2));
        assert_eq!(set.remove(e(3)), None);
        assert_eq!(set.remove(e(50)), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_reinsert_after_remove() {
        let mut set = SparseSet::new();
        set.insert(e(0));
        set.insert(e(1));
        set.remove(e(0));
        assert_eq!(set.insert(e(0)), 1);
        assert_eq!(set.entity_at(0), Some(e(1)));
        assert_eq!(set.entity_at(1), Some(e(0)));
        assert_eq!(set.entity_at(2), None);
    }
}
