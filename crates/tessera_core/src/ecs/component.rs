//! # Component System
//!
//! Components are pure data containers with no behavior.
//! The world stores them as raw bytes; the `Pod` bound is what lets typed
//! accessors reinterpret those bytes safely.

use bytemuck::{Pod, Zeroable};

use super::entity::Entity;

/// Marker trait for typed component access.
///
/// Components must be:
/// - `Pod`: Plain old data, safe to view as bytes
/// - `Zeroable`: Freshly attached components start as all-zero bytes
///
/// Implemented for every qualifying type.
///
/// # Example
///
/// ```rust
/// use bytemuck::{Pod, Zeroable};
///
/// #[derive(Clone, Copy, Default, Pod, Zeroable)]
/// #[repr(C)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// let mut world = tessera_core::World::new();
/// let position = world.register::<Position>().unwrap();
/// assert_eq!(world.storage(position).unwrap().element_size(), 8);
/// ```
pub trait Component: Pod + Zeroable + Send + Sync + 'static {}

impl<T: Pod + Zeroable + Send + Sync + 'static> Component for T {}

/// Relation pair component.
///
/// Records "this entity is related to `target` via relation type `tag`".
/// An entity holds at most one pair at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Relation {
    /// Relation type (a registered component or tag type).
    pub tag: Entity,
    /// Related entity.
    pub target: Entity,
}

impl Relation {
    /// Creates a new relation pair.
    #[inline]
    #[must_use]
    pub const fn new(tag: Entity, target: Entity) -> Self {
        Self { tag, target }
    }
}

/// Prefab record: a template expanding to a fixed list of component types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prefab {
    /// Component types (or nested prefabs) attached by this prefab.
    pub components: Vec<Entity>,
}
