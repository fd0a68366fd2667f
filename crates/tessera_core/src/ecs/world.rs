//! # ECS World
//!
//! The central container for all entities and components.
//!
//! Component types, systems and prefabs are entities themselves. Four
//! component types are registered by the world before anything else, so they
//! always occupy slots 0..4:
//!
//! | Slot | Handle | Backing |
//! |------|--------|---------|
//! | 0 | [`World::SYSTEM`] | typed column of system records |
//! | 1 | [`World::PREFAB`] | typed column of prefab records |
//! | 2 | [`World::RELATION`] | byte storage of [`Relation`] pairs |
//! | 3 | [`World::CHILD_OF`] | zero-size tag |

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use super::component::{Component, Prefab, Relation};
use super::entity::{Entity, EntityKind, EntityRecord, NIL_SLOT};
use super::query::{self, View};
use super::storage::{Column, ComponentStorage};
use super::system::SystemRecord;
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};

/// The ECS World - owner of every entity, storage and record.
///
/// # Example
///
/// ```rust
/// use tessera_core::World;
///
/// let mut world = World::new();
/// let health = world.register::<u32>().unwrap();
///
/// let entity = world.spawn().unwrap();
/// world.set_as(entity, health, &100u32).unwrap();
/// assert_eq!(world.get_as::<u32>(entity, health).unwrap(), Some(100));
/// ```
pub struct World {
    /// Entity table, indexed by slot.
    pub(crate) entities: Vec<EntityRecord>,
    /// Recyclable slots. Generations are already bumped.
    free_slots: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// Byte storages keyed by component-type slot.
    pub(crate) storages: HashMap<u32, ComponentStorage>,
    /// Records backing [`World::SYSTEM`].
    pub(crate) systems: Column<SystemRecord>,
    /// Records backing [`World::PREFAB`].
    prefabs: Column<Prefab>,
    /// Sizing configuration.
    config: WorldConfig,
}

impl World {
    /// Built-in component type holding system records.
    pub const SYSTEM: Entity = Entity::new(0, 0, EntityKind::Component);
    /// Built-in component type holding prefab records.
    pub const PREFAB: Entity = Entity::new(1, 0, EntityKind::Component);
    /// Built-in component type holding relation pairs.
    pub const RELATION: Entity = Entity::new(2, 0, EntityKind::Component);
    /// Built-in "child of" relation tag.
    pub const CHILD_OF: Entity = Entity::new(3, 0, EntityKind::Component);
    /// Number of built-in component types.
    pub const BUILTIN_COUNT: usize = 4;

    /// Creates a world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(WorldConfig::default())
    }

    /// Creates a world with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration is
    /// inconsistent.
    pub fn with_config(config: WorldConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: WorldConfig) -> Self {
        let mut world = Self {
            entities: Vec::with_capacity(config.initial_entities.max(Self::BUILTIN_COUNT)),
            free_slots: Vec::new(),
            alive_count: 0,
            storages: HashMap::new(),
            systems: Column::new(),
            prefabs: Column::new(),
            config,
        };
        world.bootstrap();
        world
    }

    /// Registers the built-in component types in their fixed order.
    fn bootstrap(&mut self) {
        for builtin in [Self::SYSTEM, Self::PREFAB, Self::RELATION, Self::CHILD_OF] {
            debug_assert_eq!(builtin.slot() as usize, self.entities.len());
            self.entities.push(EntityRecord::new(builtin));
            self.alive_count += 1;
        }

        let reserve = self.config.initial_components;
        self.storages.insert(
            Self::RELATION.slot(),
            ComponentStorage::with_capacity(
                Self::RELATION,
                std::mem::size_of::<Relation>(),
                reserve,
            ),
        );
        self.storages.insert(
            Self::CHILD_OF.slot(),
            ComponentStorage::with_capacity(Self::CHILD_OF, 0, reserve),
        );

        debug!(
            builtins = Self::BUILTIN_COUNT,
            max_entities = ?self.config.max_entities,
            "world bootstrapped"
        );
    }

    /// Returns the configuration the world was built with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns the number of currently alive entities (built-ins included).
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Returns the number of entity table slots ever allocated.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterates over all alive entities in table order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .iter()
            .filter(|record| record.alive)
            .map(|record| record.entity)
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Spawns a new plain entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if the configured entity limit
    /// is reached.
    pub fn spawn(&mut self) -> EcsResult<Entity> {
        self.allocate(EntityKind::Normal)
    }

    /// Allocates a slot for an entity of the given kind.
    ///
    /// Recycled slots keep their (already bumped) generation.
    pub(crate) fn allocate(&mut self, kind: EntityKind) -> EcsResult<Entity> {
        if let Some(slot) = self.free_slots.pop() {
            let record = &mut self.entities[slot as usize];
            let entity = record.entity.with_kind(kind);
            *record = EntityRecord::new(entity);
            self.alive_count += 1;
            trace!(?entity, "recycled entity slot");
            return Ok(entity);
        }

        let limit = self
            .config
            .max_entities
            .unwrap_or(NIL_SLOT as usize)
            .min(NIL_SLOT as usize);
        if self.entities.len() >= limit {
            warn!(limit, "entity capacity exceeded");
            return Err(EcsError::CapacityExceeded { limit });
        }

        #[allow(clippy::cast_possible_truncation)]
        let entity = Entity::new(self.entities.len() as u32, 0, kind);
        self.entities.push(EntityRecord::new(entity));
        self.alive_count += 1;
        trace!(?entity, "allocated entity slot");
        Ok(entity)
    }

    /// Checks if the handle is in range and matches the table exactly
    /// (slot, generation and kind).
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.entities
            .get(entity.slot() as usize)
            .is_some_and(|record| record.matches(entity))
    }

    /// Fails with [`EcsError::InvalidEntity`] unless `entity` is valid.
    #[inline]
    pub(crate) fn check(&self, entity: Entity) -> EcsResult<()> {
        if self.is_valid(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity(entity))
        }
    }

    /// Checks if `entity` is one of the built-in component types.
    #[inline]
    #[must_use]
    pub fn is_builtin(entity: Entity) -> bool {
        matches!(
            entity,
            Self::SYSTEM | Self::PREFAB | Self::RELATION | Self::CHILD_OF
        )
    }

    /// Despawns an entity, freeing its slot for reuse.
    ///
    /// A slot whose generation is exhausted is retired instead of recycled,
    /// so a stale handle never matches a later entity.
    ///
    /// System and prefab records owned by the entity are released first,
    /// then every component it carries. Despawning a component type also
    /// drops that type's storage.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if the handle is stale
    /// - [`EcsError::BuiltinComponent`] for the built-in component types
    pub fn despawn(&mut self, entity: Entity) -> EcsResult<()> {
        self.check(entity)?;
        if Self::is_builtin(entity) {
            return Err(EcsError::BuiltinComponent(entity));
        }

        self.systems.remove(entity);
        self.prefabs.remove(entity);
        if entity.is_a(EntityKind::Component) {
            self.storages.remove(&entity.slot());
        }
        for storage in self.storages.values_mut() {
            storage.remove(entity);
        }

        let slot = entity.slot();
        let record = &mut self.entities[slot as usize];
        record.entity = entity.next_generation().with_kind(EntityKind::Normal);
        record.alive = false;
        self.alive_count -= 1;

        // A wrapped generation would let old handles alias the next tenant.
        if entity.generation() == u16::MAX {
            debug!(slot, "retired entity slot");
        } else {
            self.free_slots.push(slot);
        }

        trace!(?entity, "despawned entity");
        Ok(())
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a component type with the given element size in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if the entity limit is reached.
    pub fn register_component(&mut self, element_size: usize) -> EcsResult<Entity> {
        let component = self.allocate(EntityKind::Component)?;
        self.storages.insert(
            component.slot(),
            ComponentStorage::with_capacity(
                component,
                element_size,
                self.config.initial_components,
            ),
        );
        debug!(?component, element_size, "registered component type");
        Ok(component)
    }

    /// Registers a component type sized for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if the entity limit is reached.
    pub fn register<T: Component>(&mut self) -> EcsResult<Entity> {
        self.register_component(std::mem::size_of::<T>())
    }

    /// Registers a zero-size tag type.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if the entity limit is reached.
    pub fn register_tag(&mut self) -> EcsResult<Entity> {
        self.register_component(0)
    }

    /// Registers a prefab expanding to `components`.
    ///
    /// Entries may be component types, tags or other prefabs.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if an entry is stale
    /// - [`EcsError::NotAComponentType`] if an entry is neither a component
    ///   type nor a prefab
    /// - [`EcsError::NotAttachable`] if an entry is a built-in record type
    pub fn register_prefab(&mut self, components: &[Entity]) -> EcsResult<Entity> {
        for &component in components {
            self.check(component)?;
            if !(component.is_a(EntityKind::Component) || component.is_a(EntityKind::Prefab)) {
                return Err(EcsError::NotAComponentType(component));
            }
            if Self::is_record_type(component) {
                return Err(EcsError::NotAttachable(component));
            }
        }

        let prefab = self.allocate(EntityKind::Prefab)?;
        self.prefabs.insert(
            prefab,
            Prefab {
                components: components.to_vec(),
            },
        );
        debug!(?prefab, count = components.len(), "registered prefab");
        Ok(prefab)
    }

    /// The record of a registered prefab.
    #[must_use]
    pub fn prefab(&self, prefab: Entity) -> Option<&Prefab> {
        self.prefabs.get(prefab)
    }

    /// Built-in types whose data must go through a dedicated API.
    #[inline]
    fn is_record_type(component: Entity) -> bool {
        matches!(component, Self::SYSTEM | Self::PREFAB | Self::RELATION)
    }

    // =========================================================================
    // Storage access
    // =========================================================================

    /// Byte storage for a component type, if it has one.
    #[must_use]
    pub fn storage(&self, component: Entity) -> Option<&ComponentStorage> {
        if !self.is_valid(component) {
            return None;
        }
        self.storages.get(&component.slot())
    }

    /// Number of entities carrying `component`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if the handle is stale
    /// - [`EcsError::MissingStorage`] if it is not a component type
    pub fn storage_len(&self, component: Entity) -> EcsResult<usize> {
        self.check(component)?;
        match component {
            Self::SYSTEM => Ok(self.systems.len()),
            Self::PREFAB => Ok(self.prefabs.len()),
            _ => self.storage_ref(component).map(ComponentStorage::len),
        }
    }

    fn storage_ref(&self, component: Entity) -> EcsResult<&ComponentStorage> {
        self.storages
            .get(&component.slot())
            .ok_or(EcsError::MissingStorage(component))
    }

    pub(crate) fn storage_mut(&mut self, component: Entity) -> EcsResult<&mut ComponentStorage> {
        self.storages
            .get_mut(&component.slot())
            .ok_or(EcsError::MissingStorage(component))
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Checks if `entity` carries `component`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if either handle is stale
    /// - [`EcsError::MissingStorage`] if `component` is not a component type
    pub fn has(&self, entity: Entity, component: Entity) -> EcsResult<bool> {
        self.check(entity)?;
        self.check(component)?;
        match component {
            Self::SYSTEM => Ok(self.systems.contains(entity)),
            Self::PREFAB => Ok(self.prefabs.contains(entity)),
            _ => Ok(self.storage_ref(component)?.contains(entity)),
        }
    }

    /// Attaches `component` to `entity` with zeroed data.
    ///
    /// Attaching a prefab attaches every entry of its list, recursively.
    /// The whole expansion is validated before anything is attached, so a
    /// failed attach leaves the entity untouched. Attaching a component the
    /// entity already carries is a no-op.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if either handle (or a prefab entry) is
    ///   stale
    /// - [`EcsError::NotAttachable`] for systems, relation pairs and the
    ///   built-in record types
    /// - [`EcsError::MissingStorage`] if `component` has no storage
    pub fn attach(&mut self, entity: Entity, component: Entity) -> EcsResult<()> {
        self.check(entity)?;
        self.check(component)?;

        let mut expanded = Vec::new();
        self.expand(component, &mut expanded)?;
        for component in expanded {
            let storage = self.storage_mut(component)?;
            if !storage.contains(entity) {
                storage.emplace(entity);
                trace!(?entity, ?component, "attached component");
            }
        }
        Ok(())
    }

    /// Resolves `component` into the storage-backed types it attaches.
    fn expand(&self, component: Entity, out: &mut Vec<Entity>) -> EcsResult<()> {
        match component.kind() {
            EntityKind::Prefab => {
                let prefab = self
                    .prefabs
                    .get(component)
                    .ok_or(EcsError::MissingStorage(component))?;
                for &entry in &prefab.components {
                    self.check(entry)?;
                    self.expand(entry, out)?;
                }
                Ok(())
            }
            EntityKind::System | EntityKind::Relation => Err(EcsError::NotAttachable(component)),
            EntityKind::Component | EntityKind::Normal => {
                if Self::is_record_type(component) {
                    return Err(EcsError::NotAttachable(component));
                }
                self.storage_ref(component)?;
                out.push(component);
                Ok(())
            }
        }
    }

    /// Detaches `component` from `entity`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if either handle is stale
    /// - [`EcsError::NotAttachable`] for the system and prefab record types
    /// - [`EcsError::MissingStorage`] if `component` has no storage
    /// - [`EcsError::MissingComponent`] if `entity` does not carry it
    pub fn detach(&mut self, entity: Entity, component: Entity) -> EcsResult<()> {
        self.check(entity)?;
        self.check(component)?;
        if matches!(component, Self::SYSTEM | Self::PREFAB) {
            return Err(EcsError::NotAttachable(component));
        }

        let storage = self.storage_mut(component)?;
        if !storage.remove(entity) {
            return Err(EcsError::MissingComponent { entity, component });
        }
        trace!(?entity, ?component, "detached component");
        Ok(())
    }

    /// Component bytes of `entity`, or `None` if it lacks the component.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if either handle is stale
    /// - [`EcsError::MissingStorage`] if `component` has no byte storage
    pub fn get(&self, entity: Entity, component: Entity) -> EcsResult<Option<&[u8]>> {
        self.check(entity)?;
        self.check(component)?;
        Ok(self.storage_ref(component)?.get(entity))
    }

    /// Mutable component bytes of `entity`, or `None` if it lacks the
    /// component.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut(&mut self, entity: Entity, component: Entity) -> EcsResult<Option<&mut [u8]>> {
        self.check(entity)?;
        self.check(component)?;
        if Self::is_record_type(component) {
            return Err(EcsError::NotAttachable(component));
        }
        Ok(self.storage_mut(component)?.get_mut(entity))
    }

    /// Copies `data` into `entity`'s component, attaching it first if needed.
    ///
    /// An existing component is overwritten in place.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if either handle is stale
    /// - [`EcsError::NotAttachable`] for the built-in record types
    /// - [`EcsError::MissingStorage`] if `component` has no byte storage
    /// - [`EcsError::SizeMismatch`] if `data` is not exactly one element
    pub fn set(&mut self, entity: Entity, component: Entity, data: &[u8]) -> EcsResult<()> {
        self.check(entity)?;
        self.check(component)?;
        if Self::is_record_type(component) {
            return Err(EcsError::NotAttachable(component));
        }

        let storage = self.storage_mut(component)?;
        if data.len() != storage.element_size() {
            return Err(EcsError::SizeMismatch {
                component,
                expected: storage.element_size(),
                actual: data.len(),
            });
        }

        let bytes = if storage.contains(entity) {
            storage.get_mut(entity).ok_or(EcsError::MissingComponent { entity, component })?
        } else {
            storage.emplace(entity)
        };
        bytes.copy_from_slice(data);
        Ok(())
    }

    /// Typed copy of `entity`'s component.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get), plus [`EcsError::SizeMismatch`] if `T`
    /// does not match the registered element size.
    pub fn get_as<T: Component>(&self, entity: Entity, component: Entity) -> EcsResult<Option<T>> {
        self.check(entity)?;
        self.check(component)?;
        let storage = self.storage_ref(component)?;
        Self::check_size::<T>(storage, component)?;
        Ok(storage.get(entity).map(bytemuck::pod_read_unaligned))
    }

    /// Typed [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn set_as<T: Component>(
        &mut self,
        entity: Entity,
        component: Entity,
        value: &T,
    ) -> EcsResult<()> {
        self.set(entity, component, bytemuck::bytes_of(value))
    }

    fn check_size<T: Component>(storage: &ComponentStorage, component: Entity) -> EcsResult<()> {
        let actual = std::mem::size_of::<T>();
        if actual == storage.element_size() {
            Ok(())
        } else {
            Err(EcsError::SizeMismatch {
                component,
                expected: storage.element_size(),
                actual,
            })
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Invokes `callback` once per alive entity carrying every component in
    /// `components`, in entity-table order.
    ///
    /// The [`View`] handed to the callback exposes the matched component data
    /// in the order requested and must not outlive the call. Returns the
    /// number of matches.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if a component handle is stale
    /// - [`EcsError::DuplicateComponent`] if a type is listed twice
    /// - [`EcsError::MissingStorage`] if a type has no byte storage
    pub fn query<F>(&mut self, components: &[Entity], mut callback: F) -> EcsResult<usize>
    where
        F: FnMut(&mut View<'_>),
    {
        query::run(&self.entities, &mut self.storages, components, &mut callback)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};

    #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.alive_count(), World::BUILTIN_COUNT);
        assert!(world.is_valid(World::SYSTEM));
        assert!(world.is_valid(World::PREFAB));
        assert!(world.is_valid(World::RELATION));
        assert!(world.is_valid(World::CHILD_OF));
        assert_eq!(
            world.entities().collect::<Vec<_>>(),
            vec![World::SYSTEM, World::PREFAB, World::RELATION, World::CHILD_OF]
        );
    }

    #[test]
    fn test_spawn_despawn() {
        let mut world = World::new();

        let id1 = world.spawn().unwrap();
        assert!(world.is_valid(id1));
        assert!(id1.is_a(EntityKind::Normal));
        assert_eq!(world.alive_count(), World::BUILTIN_COUNT + 1);

        let id2 = world.spawn().unwrap();
        assert_eq!(world.alive_count(), World::BUILTIN_COUNT + 2);

        world.despawn(id1).unwrap();
        assert!(!world.is_valid(id1));
        assert!(world.is_valid(id2));
        assert_eq!(world.alive_count(), World::BUILTIN_COUNT + 1);

        // Spawn again - should reuse the slot
        let id3 = world.spawn().unwrap();
        assert_eq!(id3.slot(), id1.slot());
        assert!(id3.generation() > id1.generation());
        assert_ne!(id3, id1);
        assert!(!world.is_valid(id1));
        assert!(world.is_valid(id3));
    }

    #[test]
    fn test_despawn_stale() {
        let mut world = World::new();
        let e = world.spawn().unwrap();
        world.despawn(e).unwrap();
        assert_eq!(world.despawn(e), Err(EcsError::InvalidEntity(e)));
        assert_eq!(
            world.despawn(Entity::NULL),
            Err(EcsError::InvalidEntity(Entity::NULL))
        );
    }

    #[test]
    fn test_validity_includes_kind() {
        let mut world = World::new();
        let e = world.spawn().unwrap();
        assert!(!world.is_valid(e.with_kind(EntityKind::Component)));
    }

    #[test]
    fn test_builtins_protected() {
        let mut world = World::new();
        for builtin in [World::SYSTEM, World::PREFAB, World::RELATION, World::CHILD_OF] {
            assert_eq!(world.despawn(builtin), Err(EcsError::BuiltinComponent(builtin)));
        }
        let e = world.spawn().unwrap();
        for record in [World::SYSTEM, World::PREFAB, World::RELATION] {
            assert_eq!(world.attach(e, record), Err(EcsError::NotAttachable(record)));
        }
        world.attach(e, World::CHILD_OF).unwrap();
        assert!(world.has(e, World::CHILD_OF).unwrap());
    }

    #[test]
    fn test_attach_detach_round_trip() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let e = world.spawn().unwrap();

        world.attach(e, position).unwrap();
        assert!(world.has(e, position).unwrap());
        assert_eq!(world.get_as::<Position>(e, position).unwrap(), Some(Position::default()));

        world.detach(e, position).unwrap();
        assert!(!world.has(e, position).unwrap());
        assert_eq!(
            world.detach(e, position),
            Err(EcsError::MissingComponent {
                entity: e,
                component: position
            })
        );
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let e = world.spawn().unwrap();

        world.set_as(e, position, &Position { x: 1.0, y: 2.0 }).unwrap();
        world.attach(e, position).unwrap();
        assert_eq!(world.storage_len(position).unwrap(), 1);
        assert_eq!(
            world.get_as::<Position>(e, position).unwrap(),
            Some(Position { x: 1.0, y: 2.0 })
        );
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let a = world.spawn().unwrap();
        let b = world.spawn().unwrap();

        world.set_as(a, position, &Position { x: 1.0, y: 1.0 }).unwrap();
        world.set_as(b, position, &Position { x: 2.0, y: 2.0 }).unwrap();
        world.set_as(a, position, &Position { x: 3.0, y: 3.0 }).unwrap();

        let storage = world.storage(position).unwrap();
        assert_eq!(storage.entities(), &[a, b]);
        assert_eq!(
            world.get_as::<Position>(a, position).unwrap(),
            Some(Position { x: 3.0, y: 3.0 })
        );
    }

    #[test]
    fn test_set_size_mismatch() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let e = world.spawn().unwrap();

        assert_eq!(
            world.set(e, position, &[0u8; 3]),
            Err(EcsError::SizeMismatch {
                component: position,
                expected: 8,
                actual: 3
            })
        );
        assert!(matches!(
            world.get_as::<u64>(e, position),
            Err(EcsError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_get_missing() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let e = world.spawn().unwrap();
        assert_eq!(world.get(e, position).unwrap(), None);

        let plain = world.spawn().unwrap();
        assert_eq!(world.get(e, plain), Err(EcsError::MissingStorage(plain)));
    }

    #[test]
    fn test_despawn_removes_components() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let tag = world.register_tag().unwrap();
        let a = world.spawn().unwrap();
        let b = world.spawn().unwrap();

        world.set_as(a, position, &Position { x: 1.0, y: 0.0 }).unwrap();
        world.set_as(b, position, &Position { x: 2.0, y: 0.0 }).unwrap();
        world.attach(a, tag).unwrap();

        world.despawn(a).unwrap();
        assert_eq!(world.storage_len(position).unwrap(), 1);
        assert_eq!(world.storage_len(tag).unwrap(), 0);
        assert_eq!(
            world.get_as::<Position>(b, position).unwrap(),
            Some(Position { x: 2.0, y: 0.0 })
        );

        let c = world.spawn().unwrap();
        assert_eq!(c.slot(), a.slot());
        assert!(!world.has(c, position).unwrap());
    }

    #[test]
    fn test_despawn_component_type_drops_storage() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let e = world.spawn().unwrap();
        world.attach(e, position).unwrap();

        world.despawn(position).unwrap();
        assert!(world.storage(position).is_none());
        assert_eq!(world.has(e, position), Err(EcsError::InvalidEntity(position)));

        // The recycled slot is a plain entity without storage.
        let recycled = world.spawn().unwrap();
        assert_eq!(recycled.slot(), position.slot());
        assert_eq!(world.attach(e, recycled), Err(EcsError::MissingStorage(recycled)));
    }

    #[test]
    fn test_capacity_limit() {
        let config = WorldConfig {
            max_entities: Some(World::BUILTIN_COUNT + 1),
            ..WorldConfig::default()
        };
        let mut world = World::with_config(config).unwrap();

        let e = world.spawn().unwrap();
        assert_eq!(
            world.spawn(),
            Err(EcsError::CapacityExceeded {
                limit: World::BUILTIN_COUNT + 1
            })
        );

        // Recycling does not grow the table.
        world.despawn(e).unwrap();
        assert!(world.spawn().is_ok());
    }

    #[test]
    fn test_prefab_expansion() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let velocity = world.register::<Position>().unwrap();
        let tag = world.register_tag().unwrap();

        let inner = world.register_prefab(&[velocity, tag]).unwrap();
        let outer = world.register_prefab(&[position, inner]).unwrap();
        assert!(outer.is_a(EntityKind::Prefab));
        assert!(!outer.is_a(EntityKind::Component));
        assert!(world.has(outer, World::PREFAB).unwrap());

        let e = world.spawn().unwrap();
        world.attach(e, outer).unwrap();
        assert!(world.has(e, position).unwrap());
        assert!(world.has(e, velocity).unwrap());
        assert!(world.has(e, tag).unwrap());
        assert!(!world.has(e, World::PREFAB).unwrap());
    }

    #[test]
    fn test_prefab_rejects_plain_entries() {
        let mut world = World::new();
        let plain = world.spawn().unwrap();
        assert_eq!(
            world.register_prefab(&[plain]),
            Err(EcsError::NotAComponentType(plain))
        );
        assert_eq!(
            world.register_prefab(&[World::RELATION]),
            Err(EcsError::NotAttachable(World::RELATION))
        );
    }

    #[test]
    fn test_despawn_prefab_releases_record() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let prefab = world.register_prefab(&[position]).unwrap();
        assert_eq!(world.storage_len(World::PREFAB).unwrap(), 1);

        world.despawn(prefab).unwrap();
        assert!(world.prefab(prefab).is_none());
        assert_eq!(world.storage_len(World::PREFAB).unwrap(), 0);
    }

    #[test]
    fn test_exhausted_slot_is_retired() {
        let mut world = World::new();
        let old = world.spawn().unwrap();

        let mut current = old;
        for _ in 0..=u16::MAX {
            world.despawn(current).unwrap();
            current = world.spawn().unwrap();
        }

        assert!(!world.is_valid(old));
        assert!(world.is_valid(current));
        assert_ne!(current.slot(), old.slot());
        assert_eq!(world.slot_count(), World::BUILTIN_COUNT + 2);

        // The retired slot stays out of circulation.
        world.despawn(current).unwrap();
        assert_eq!(world.spawn().unwrap().slot(), current.slot());
        assert_eq!(world.spawn().unwrap().slot(), current.slot() + 1);
    }

    #[test]
    fn test_failed_prefab_attach_leaves_entity_untouched() {
        let mut world = World::new();
        let position = world.register::<Position>().unwrap();
        let velocity = world.register::<Position>().unwrap();
        let tag = world.register_tag().unwrap();
        let inner = world.register_prefab(&[tag, velocity]).unwrap();
        let outer = world.register_prefab(&[position, inner]).unwrap();
        let e = world.spawn().unwrap();

        world.despawn(velocity).unwrap();
        assert_eq!(world.attach(e, outer), Err(EcsError::InvalidEntity(velocity)));
        assert!(!world.has(e, position).unwrap());
        assert!(!world.has(e, tag).unwrap());
        assert_eq!(world.storage_len(position).unwrap(), 0);
    }
}
