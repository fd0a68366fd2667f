//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - A slot into the world's entity table
//! - A generation counter for safe reuse
//! - A kind tag classifying what the entity stands for
//!
//! Component types, systems and prefabs are entities too; the kind tag is
//! how the world tells them apart from plain entities.

use bytemuck::{Pod, Zeroable};
use std::fmt;

const SLOT_MASK: u64 = 0xFFFF_FFFF;
const GENERATION_SHIFT: u32 = 32;
const GENERATION_MASK: u64 = 0xFFFF;
const KIND_SHIFT: u32 = 56;

/// Slot value reserved for the nil entity.
pub const NIL_SLOT: u32 = u32::MAX;

/// Classification carried in every entity handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntityKind {
    /// A plain entity created with `spawn`.
    Normal = 0,
    /// A registered component (or tag) type.
    Component = 1 << 0,
    /// A registered system.
    System = 1 << 1,
    /// A registered prefab.
    Prefab = 1 << 2,
    /// A relation-pair entity.
    Relation = 1 << 3,
}

impl EntityKind {
    /// Converts a raw tag byte back into a kind.
    ///
    /// Unknown values are classified as [`EntityKind::Normal`].
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Component,
            2 => Self::System,
            4 => Self::Prefab,
            8 => Self::Relation,
            _ => Self::Normal,
        }
    }
}

/// Generational entity handle.
///
/// Packed into a single `u64`:
/// - Bits 0..32: slot in the entity table
/// - Bits 32..48: generation counter for detecting stale references
/// - Bits 48..56: reserved, always zero
/// - Bits 56..64: [`EntityKind`] tag
///
/// Two handles are equal iff every field is equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Null/invalid entity.
    pub const NULL: Self = Self(u64::MAX);

    /// Composes a handle from its parts.
    ///
    /// # Arguments
    ///
    /// * `slot` - Index into the entity table
    /// * `generation` - Generation counter of the slot
    /// * `kind` - Classification tag
    #[inline]
    #[must_use]
    pub const fn new(slot: u32, generation: u16, kind: EntityKind) -> Self {
        Self(
            ((kind as u64) << KIND_SHIFT)
                | ((generation as u64) << GENERATION_SHIFT)
                | (slot as u64),
        )
    }

    /// Reconstructs a handle from its packed representation.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the packed representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Returns the slot portion of the handle.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u32 {
        (self.0 & SLOT_MASK) as u32
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u16 {
        ((self.0 >> GENERATION_SHIFT) & GENERATION_MASK) as u16
    }

    /// Returns the kind tag of the handle.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        EntityKind::from_u8((self.0 >> KIND_SHIFT) as u8)
    }

    /// Checks the kind tag.
    #[inline]
    #[must_use]
    pub const fn is_a(self, kind: EntityKind) -> bool {
        (self.0 >> KIND_SHIFT) as u8 == kind as u8
    }

    /// Checks if this is the nil entity.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.slot() == NIL_SLOT
    }

    /// Same slot and kind, generation advanced by one.
    #[inline]
    #[must_use]
    pub(crate) const fn next_generation(self) -> Self {
        Self::new(self.slot(), self.generation().wrapping_add(1), self.kind())
    }

    /// Same slot and generation, different kind.
    #[inline]
    #[must_use]
    pub(crate) const fn with_kind(self, kind: EntityKind) -> Self {
        Self::new(self.slot(), self.generation(), kind)
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Entity(nil)");
        }
        write!(
            f,
            "Entity({}v{} {:?})",
            self.slot(),
            self.generation(),
            self.kind()
        )
    }
}

/// One row of the world's entity table.
///
/// The stored handle's slot never changes; its generation advances each time
/// the slot is freed.
#[derive(Clone, Copy, Debug)]
pub struct EntityRecord {
    /// The current handle for this slot.
    pub entity: Entity,
    /// Whether this slot is currently live.
    pub alive: bool,
}

impl EntityRecord {
    /// Creates a live record.
    #[inline]
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self {
            entity,
            alive: true,
        }
    }

    /// Checks if this record currently answers for `entity`.
    #[inline]
    #[must_use]
    pub fn matches(&self, entity: Entity) -> bool {
        self.alive && self.entity == entity
    }
}
