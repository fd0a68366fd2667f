//! # Query Engine
//!
//! Walks the entity table in slot order and yields a [`View`] for every alive
//! entity that carries all requested component types.
//!
//! Membership is tested storage by storage, in the order the types were
//! requested, and the scan moves on at the first miss. Views borrow the
//! storages mutably for the duration of one callback, so the world cannot be
//! restructured while a query is running.
//!
//! Relation pairs are validated by `associate`, so their fields are handed out
//! read-only.

use std::collections::HashMap;

use super::component::Component;
use super::entity::{Entity, EntityRecord};
use super::storage::ComponentStorage;
use super::world::World;
use crate::error::{EcsError, EcsResult};

/// Borrowed bytes of one view field.
pub(crate) enum Field<'a> {
    /// Readable only.
    Shared(&'a [u8]),
    /// Readable and writable.
    Exclusive(&'a mut [u8]),
}

/// Component data of one matched entity.
///
/// Field `i` belongs to the `i`-th requested component type.
pub struct View<'a> {
    entity: Entity,
    components: &'a [Entity],
    fields: Vec<Field<'a>>,
}

impl<'a> View<'a> {
    pub(crate) fn new(entity: Entity, components: &'a [Entity], fields: Vec<Field<'a>>) -> Self {
        debug_assert_eq!(components.len(), fields.len());
        Self {
            entity,
            components,
            fields,
        }
    }

    /// The matched entity.
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Number of fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the view has no fields.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Component type of field `index`.
    #[inline]
    #[must_use]
    pub fn component(&self, index: usize) -> Option<Entity> {
        self.components.get(index).copied()
    }

    /// Field index of `component`, if it is part of this view.
    #[must_use]
    pub fn index_of(&self, component: Entity) -> Option<usize> {
        self.components.iter().position(|&c| c == component)
    }

    /// Raw bytes of field `index`.
    #[inline]
    #[must_use]
    pub fn bytes(&self, index: usize) -> Option<&[u8]> {
        match self.fields.get(index)? {
            Field::Shared(bytes) => Some(*bytes),
            Field::Exclusive(bytes) => Some(&**bytes),
        }
    }

    /// Mutable raw bytes of field `index`.
    ///
    /// `None` if the index is out of range or the field is read-only
    /// ([`World::RELATION`]).
    #[inline]
    pub fn bytes_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        match self.fields.get_mut(index)? {
            Field::Shared(_) => None,
            Field::Exclusive(bytes) => Some(&mut **bytes),
        }
    }

    /// Field `index` viewed as `T`.
    ///
    /// `None` if the index is out of range or `T` does not match the field's
    /// size or alignment.
    #[must_use]
    pub fn field<T: Component>(&self, index: usize) -> Option<&T> {
        bytemuck::try_from_bytes(self.bytes(index)?).ok()
    }

    /// Field `index` viewed mutably as `T`.
    ///
    /// `None` under the same conditions as [`field`](Self::field), or if the
    /// field is read-only.
    pub fn field_mut<T: Component>(&mut self, index: usize) -> Option<&mut T> {
        bytemuck::try_from_bytes_mut(self.bytes_mut(index)?).ok()
    }

    /// Copy of field `index` as `T`, regardless of alignment.
    #[must_use]
    pub fn read<T: Component>(&self, index: usize) -> Option<T> {
        let bytes = self.bytes(index)?;
        (bytes.len() == std::mem::size_of::<T>()).then(|| bytemuck::pod_read_unaligned(bytes))
    }
}

/// Validates a component-type list against the entity table.
pub(crate) fn validate(records: &[EntityRecord], components: &[Entity]) -> EcsResult<()> {
    for (i, &component) in components.iter().enumerate() {
        let valid = records
            .get(component.slot() as usize)
            .is_some_and(|record| record.matches(component));
        if !valid {
            return Err(EcsError::InvalidEntity(component));
        }
        if components[..i].contains(&component) {
            return Err(EcsError::DuplicateComponent(component));
        }
    }
    Ok(())
}

/// Borrows the storages for `components`, in request order.
///
/// The list must be free of duplicates.
fn columns_mut<'s>(
    storages: &'s mut HashMap<u32, ComponentStorage>,
    components: &[Entity],
) -> EcsResult<Vec<&'s mut ComponentStorage>> {
    let mut columns: Vec<Option<&'s mut ComponentStorage>> =
        components.iter().map(|_| None).collect();
    for (&slot, storage) in storages.iter_mut() {
        if let Some(i) = components.iter().position(|c| c.slot() == slot) {
            columns[i] = Some(storage);
        }
    }

    columns
        .into_iter()
        .zip(components)
        .map(|(column, &component)| column.ok_or(EcsError::MissingStorage(component)))
        .collect()
}

/// Runs one query, returning the number of matched entities.
pub(crate) fn run<F>(
    records: &[EntityRecord],
    storages: &mut HashMap<u32, ComponentStorage>,
    components: &[Entity],
    callback: &mut F,
) -> EcsResult<usize>
where
    F: FnMut(&mut View<'_>) + ?Sized,
{
    validate(records, components)?;
    let mut columns = columns_mut(storages, components)?;

    let mut matched = 0;
    for record in records.iter().filter(|record| record.alive) {
        let entity = record.entity;
        if !columns.iter().all(|column| column.contains(entity)) {
            continue;
        }

        let fields = columns
            .iter_mut()
            .filter_map(|column| {
                if column.component() == World::RELATION {
                    column.get(entity).map(Field::Shared)
                } else {
                    column.get_mut(entity).map(Field::Exclusive)
                }
            })
            .collect();
        let mut view = View::new(entity, components, fields);
        callback(&mut view);
        matched += 1;
    }
    Ok(matched)
}
