//! # Component Storage
//!
//! Dense component storage indexed through a [`SparseSet`].
//!
//! The storage uses a packed array strategy:
//! - Element `i` of the buffer belongs to `dense[i]` of the sparse set
//! - Removal swap-removes the buffer and the set in lockstep
//! - Iteration is cache-friendly (contiguous memory)
//!
//! [`ComponentStorage`] is type-erased: it knows only an element size and
//! holds raw bytes. [`Column`] is the typed variant used for records that are
//! not plain old data.

use super::entity::Entity;
use super::sparse::SparseSet;

const WORD: usize = std::mem::size_of::<u64>();

/// Number of `u64` words needed to hold `bytes` bytes.
#[inline]
const fn words_for(bytes: usize) -> usize {
    bytes.div_ceil(WORD)
}

/// Type-erased storage for a single component type.
///
/// The buffer is backed by `u64` words, so every element starts on an 8-byte
/// boundary and can be viewed as any `Pod` type with alignment up to 8.
/// Zero-sized (tag) components store no bytes at all.
#[derive(Debug, Clone)]
pub struct ComponentStorage {
    /// The component type this storage belongs to.
    component: Entity,
    /// Size of one element in bytes.
    element_size: usize,
    /// Entity -> dense position.
    set: SparseSet,
    /// Packed element bytes.
    words: Vec<u64>,
}

impl ComponentStorage {
    /// Creates empty storage for `component` with the given element size.
    #[must_use]
    pub fn new(component: Entity, element_size: usize) -> Self {
        Self::with_capacity(component, element_size, 0)
    }

    /// Creates empty storage with room for `capacity` elements.
    ///
    /// If the byte size of the reserve overflows, no bytes are reserved.
    #[must_use]
    pub fn with_capacity(component: Entity, element_size: usize, capacity: usize) -> Self {
        let reserve = capacity.checked_mul(element_size).map_or(0, words_for);
        Self {
            component,
            element_size,
            set: SparseSet::with_capacity(capacity),
            words: Vec::with_capacity(reserve),
        }
    }

    /// The component type this storage belongs to.
    #[inline]
    #[must_use]
    pub const fn component(&self) -> Entity {
        self.component
    }

    /// Element size in bytes (0 for tags).
    #[inline]
    #[must_use]
    pub const fn element_size(&self) -> usize {
        self.element_size
    }

    /// Number of stored elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Whether the storage is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Number of live bytes in the buffer.
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.len() * self.element_size
    }

    /// Checks if `entity` has an element here.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.set.contains(entity)
    }

    /// Entities in dense order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.set.dense()
    }

    /// Appends a zero-filled element for `entity` and returns its bytes.
    ///
    /// The caller must check [`contains`](Self::contains) first.
    pub fn emplace(&mut self, entity: Entity) -> &mut [u8] {
        let pos = self.set.insert(entity);
        let size = self.element_size;
        self.words.resize(words_for((pos + 1) * size), 0);

        let bytes = &mut self.bytes_mut()[pos * size..(pos + 1) * size];
        // Tail of the last word may hold bytes of a removed element.
        bytes.fill(0);
        bytes
    }

    /// Removes `entity`'s element.
    ///
    /// The last element's bytes are copied into the vacated position, exactly
    /// as the sparse set moves its last entity. Returns `false` if the entity
    /// had no element.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let last = self.len().saturating_sub(1);
        let Some(pos) = self.set.remove(entity) else {
            return false;
        };

        let size = self.element_size;
        if pos != last && size > 0 {
            self.bytes_mut()
                .copy_within(last * size..(last + 1) * size, pos * size);
        }
        self.words.truncate(words_for(last * size));
        true
    }

    /// Element bytes for `entity`, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&[u8]> {
        self.set.position_of(entity).map(|pos| self.at(pos))
    }

    /// Mutable element bytes for `entity`, if present.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut [u8]> {
        let pos = self.set.position_of(entity)?;
        Some(self.at_mut(pos))
    }

    /// Element bytes at a dense position.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range.
    #[inline]
    #[must_use]
    pub fn at(&self, pos: usize) -> &[u8] {
        assert!(pos < self.len(), "dense position {pos} out of range");
        let size = self.element_size;
        &self.bytes()[pos * size..(pos + 1) * size]
    }

    /// Mutable element bytes at a dense position.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range.
    #[inline]
    pub fn at_mut(&mut self, pos: usize) -> &mut [u8] {
        assert!(pos < self.len(), "dense position {pos} out of range");
        let size = self.element_size;
        &mut self.bytes_mut()[pos * size..(pos + 1) * size]
    }

    /// Iterates `(entity, bytes)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &[u8])> + '_ {
        self.set
            .dense()
            .iter()
            .enumerate()
            .map(move |(pos, &entity)| (entity, self.at(pos)))
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    #[inline]
    fn bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.words)
    }
}

/// Typed sparse-set storage.
///
/// Same layout contract as [`ComponentStorage`], but holding `T` values
/// directly. Used for the system and prefab records.
#[derive(Debug)]
pub struct Column<T> {
    set: SparseSet,
    items: Vec<T>,
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Self {
            set: SparseSet::new(),
            items: Vec::new(),
        }
    }
}

impl<T> Column<T> {
    /// Creates an empty column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the column is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Checks if `entity` has an item here.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.set.contains(entity)
    }

    /// Stores `value` for `entity`, replacing any previous item.
    pub fn insert(&mut self, entity: Entity, value: T) {
        if let Some(pos) = self.set.position_of(entity) {
            self.items[pos] = value;
        } else {
            self.set.insert(entity);
            self.items.push(value);
        }
    }

    /// Removes and returns `entity`'s item.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let pos = self.set.remove(entity)?;
        Some(self.items.swap_remove(pos))
    }

    /// Item for `entity`, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.set.position_of(entity).map(|pos| &self.items[pos])
    }

    /// Mutable item for `entity`, if present.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let pos = self.set.position_of(entity)?;
        Some(&mut self.items[pos])
    }

    /// Entities in dense order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.set.dense()
    }
}
