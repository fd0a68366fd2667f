//! # Relations
//!
//! An entity may hold one [`Relation`] pair, stored through the built-in
//! [`World::RELATION`] component. Lookups by target are a linear scan of the
//! entity table: O(total entities) per call.

use tracing::trace;

use super::component::Relation;
use super::entity::{Entity, EntityKind};
use super::query::{Field, View};
use super::world::World;
use crate::error::{EcsError, EcsResult};

impl World {
    /// Relates `entity` to `target` via relation type `tag`.
    ///
    /// Any relation `entity` already holds is overwritten.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if any handle is stale
    /// - [`EcsError::NotAComponentType`] if `tag` is not a component type
    /// - [`EcsError::NotAPlainEntity`] if `target` is not a plain entity
    pub fn associate(&mut self, entity: Entity, tag: Entity, target: Entity) -> EcsResult<()> {
        self.check(entity)?;
        self.check(tag)?;
        if !tag.is_a(EntityKind::Component) {
            return Err(EcsError::NotAComponentType(tag));
        }
        self.check(target)?;
        if !target.is_a(EntityKind::Normal) {
            return Err(EcsError::NotAPlainEntity(target));
        }

        let pairs = self.storage_mut(Self::RELATION)?;
        if !pairs.contains(entity) {
            pairs.emplace(entity);
        }
        if let Some(bytes) = pairs.get_mut(entity) {
            bytes.copy_from_slice(bytemuck::bytes_of(&Relation::new(tag, target)));
        }
        trace!(?entity, ?tag, ?target, "associated");
        Ok(())
    }

    /// Removes `entity`'s relation pair.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if the handle is stale
    /// - [`EcsError::NoRelation`] if `entity` holds no relation
    pub fn disassociate(&mut self, entity: Entity) -> EcsResult<()> {
        self.check(entity)?;
        if !self.storage_mut(Self::RELATION)?.remove(entity) {
            return Err(EcsError::NoRelation(entity));
        }
        trace!(?entity, "disassociated");
        Ok(())
    }

    /// The relation pair `entity` holds, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] if the handle is stale.
    pub fn relation(&self, entity: Entity) -> EcsResult<Option<Relation>> {
        self.get(entity, Self::RELATION)
            .map(|bytes| bytes.map(bytemuck::pod_read_unaligned))
    }

    /// Checks if `entity` holds a relation of type `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] if either handle is stale.
    pub fn has_relation(&self, entity: Entity, tag: Entity) -> EcsResult<bool> {
        self.check(tag)?;
        Ok(self.relation(entity)?.is_some_and(|pair| pair.tag == tag))
    }

    /// Checks if `entity` holds a relation (of any type) to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEntity`] if either handle is stale.
    pub fn related(&self, entity: Entity, target: Entity) -> EcsResult<bool> {
        self.check(target)?;
        Ok(self
            .relation(entity)?
            .is_some_and(|pair| pair.target == target))
    }

    /// Invokes `callback` for every alive entity related to `root` via `tag`,
    /// in entity-table order.
    ///
    /// Each view has a single read-only [`World::RELATION`] field holding the
    /// pair. Returns the number of matches.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingStorage`] only if the relation storage is
    /// gone, which cannot happen for a world built by this crate.
    pub fn query_relations<F>(&self, root: Entity, tag: Entity, mut callback: F) -> EcsResult<usize>
    where
        F: FnMut(&mut View<'_>),
    {
        const FIELDS: [Entity; 1] = [World::RELATION];

        let pairs = self
            .storage(Self::RELATION)
            .ok_or(EcsError::MissingStorage(Self::RELATION))?;

        let mut matched = 0;
        for record in self.entities.iter().filter(|record| record.alive) {
            let entity = record.entity;
            let Some(bytes) = pairs.get(entity) else {
                continue;
            };
            let pair: Relation = bytemuck::pod_read_unaligned(bytes);
            if pair.tag != tag || pair.target != root {
                continue;
            }

            let mut view = View::new(entity, &FIELDS, vec![Field::Shared(bytes)]);
            callback(&mut view);
            matched += 1;
        }
        Ok(matched)
    }

    /// [`query_relations`](Self::query_relations) over the built-in
    /// [`World::CHILD_OF`] tag.
    ///
    /// # Errors
    ///
    /// Same as [`query_relations`](Self::query_relations).
    pub fn children_of<F>(&self, parent: Entity, callback: F) -> EcsResult<usize>
    where
        F: FnMut(&mut View<'_>),
    {
        self.query_relations(parent, Self::CHILD_OF, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associate_and_lookup() {
        let mut world = World::new();
        let parent = world.spawn().unwrap();
        let child = world.spawn().unwrap();

        world.associate(child, World::CHILD_OF, parent).unwrap();
        assert!(world.has_relation(child, World::CHILD_OF).unwrap());
        assert!(world.related(child, parent).unwrap());
        assert!(!world.related(parent, child).unwrap());
        assert!(world.has(child, World::RELATION).unwrap());
        assert_eq!(
            world.relation(child).unwrap(),
            Some(Relation::new(World::CHILD_OF, parent))
        );
    }

    #[test]
    fn test_associate_overwrites() {
        let mut world = World::new();
        let likes = world.register_tag().unwrap();
        let a = world.spawn().unwrap();
        let b = world.spawn().unwrap();
        let c = world.spawn().unwrap();

        world.associate(a, World::CHILD_OF, b).unwrap();
        world.associate(a, likes, c).unwrap();
        assert!(!world.has_relation(a, World::CHILD_OF).unwrap());
        assert!(world.has_relation(a, likes).unwrap());
        assert!(!world.related(a, b).unwrap());
        assert!(world.related(a, c).unwrap());
        assert_eq!(world.storage_len(World::RELATION).unwrap(), 1);
    }

    #[test]
    fn test_associate_preconditions() {
        let mut world = World::new();
        let a = world.spawn().unwrap();
        let b = world.spawn().unwrap();
        let tag = world.register_tag().unwrap();

        assert_eq!(
            world.associate(a, b, b),
            Err(EcsError::NotAComponentType(b))
        );
        assert_eq!(
            world.associate(a, World::CHILD_OF, tag),
            Err(EcsError::NotAPlainEntity(tag))
        );

        world.despawn(b).unwrap();
        assert_eq!(
            world.associate(a, World::CHILD_OF, b),
            Err(EcsError::InvalidEntity(b))
        );
    }

    #[test]
    fn test_disassociate() {
        let mut world = World::new();
        let parent = world.spawn().unwrap();
        let child = world.spawn().unwrap();

        assert_eq!(world.disassociate(child), Err(EcsError::NoRelation(child)));
        world.associate(child, World::CHILD_OF, parent).unwrap();
        world.disassociate(child).unwrap();
        assert!(!world.has_relation(child, World::CHILD_OF).unwrap());
        assert_eq!(world.relation(child).unwrap(), None);
    }

    #[test]
    fn test_query_relations_filters_tag_and_target() {
        let mut world = World::new();
        let owns = world.register_tag().unwrap();
        let parent = world.spawn().unwrap();
        let other = world.spawn().unwrap();
        let a = world.spawn().unwrap();
        let b = world.spawn().unwrap();
        let c = world.spawn().unwrap();

        world.associate(a, World::CHILD_OF, parent).unwrap();
        world.associate(b, owns, parent).unwrap();
        world.associate(c, World::CHILD_OF, other).unwrap();

        let mut seen = Vec::new();
        let matched = world
            .children_of(parent, |view| {
                assert_eq!(view.component(0), Some(World::RELATION));
                let pair = view.read::<Relation>(0).unwrap();
                assert_eq!(pair.target, parent);
                seen.push(view.entity());
            })
            .unwrap();
        assert_eq!(matched, 1);
        assert_eq!(seen, vec![a]);

        assert_eq!(world.query_relations(parent, owns, |_| {}).unwrap(), 1);
        assert_eq!(world.query_relations(other, owns, |_| {}).unwrap(), 0);
    }

    #[test]
    fn test_query_relations_views_are_read_only() {
        let mut world = World::new();
        let parent = world.spawn().unwrap();
        let other = world.spawn().unwrap();
        let child = world.spawn().unwrap();
        world.associate(child, World::CHILD_OF, parent).unwrap();

        let matched = world
            .children_of(parent, |view| {
                assert!(view.bytes_mut(0).is_none());
                if let Some(pair) = view.field_mut::<Relation>(0) {
                    pair.target = other;
                }
            })
            .unwrap();
        assert_eq!(matched, 1);
        assert!(world.related(child, parent).unwrap());
        assert!(!world.related(child, other).unwrap());
    }

    #[test]
    fn test_despawned_child_drops_relation() {
        let mut world = World::new();
        let parent = world.spawn().unwrap();
        let child = world.spawn().unwrap();
        world.associate(child, World::CHILD_OF, parent).unwrap();

        world.despawn(child).unwrap();
        assert_eq!(world.children_of(parent, |_| {}).unwrap(), 0);
        assert_eq!(world.storage_len(World::RELATION).unwrap(), 0);
    }
}
