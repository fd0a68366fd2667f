//! # Systems
//!
//! A system is an entity carrying a callback and a fixed component-type list.
//! [`World::step`] runs one query per system, visiting systems in
//! entity-table order.

use std::fmt;

use tracing::{debug, trace, warn};

use super::entity::{Entity, EntityKind};
use super::query::{self, View};
use super::world::World;
use crate::error::EcsResult;

/// Boxed system callback.
pub type SystemFn = Box<dyn FnMut(&mut View<'_>) + Send>;

/// Record backing [`World::SYSTEM`].
pub struct SystemRecord {
    /// Invoked once per matching entity each step.
    callback: SystemFn,
    /// Component types the system queries.
    components: Vec<Entity>,
}

impl SystemRecord {
    /// Component types the system queries.
    #[must_use]
    pub fn components(&self) -> &[Entity] {
        &self.components
    }
}

impl fmt::Debug for SystemRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemRecord")
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Registers a system over `components`.
    ///
    /// The component list is validated now; the returned handle is tagged
    /// [`EntityKind::System`]. Despawn it to unregister the system.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`](crate::EcsError::InvalidEntity) if a
    ///   component handle is stale
    /// - [`EcsError::DuplicateComponent`](crate::EcsError::DuplicateComponent)
    ///   if a type is listed twice
    /// - [`EcsError::MissingStorage`](crate::EcsError::MissingStorage) if a
    ///   type has no byte storage
    /// - [`EcsError::CapacityExceeded`](crate::EcsError::CapacityExceeded) if
    ///   the entity limit is reached
    pub fn register_system<F>(&mut self, components: &[Entity], callback: F) -> EcsResult<Entity>
    where
        F: FnMut(&mut View<'_>) + Send + 'static,
    {
        query::validate(&self.entities, components)?;
        for &component in components {
            self.storage_mut(component)?;
        }

        let system = self.allocate(EntityKind::System)?;
        self.systems.insert(
            system,
            SystemRecord {
                callback: Box::new(callback),
                components: components.to_vec(),
            },
        );
        debug!(?system, ?components, "registered system");
        Ok(system)
    }

    /// Component types queried by a registered system.
    #[must_use]
    pub fn system_components(&self, system: Entity) -> Option<&[Entity]> {
        self.systems.get(system).map(SystemRecord::components)
    }

    /// Runs every registered system once.
    ///
    /// A system whose component list has gone stale (one of its component
    /// types was despawned) is skipped; the others still run.
    ///
    /// # Errors
    ///
    /// Returns the first skipped system's error once every other system has
    /// run.
    pub fn step(&mut self) -> EcsResult<()> {
        let Self {
            entities,
            storages,
            systems,
            ..
        } = self;

        let mut first_error = None;
        for record in entities.iter() {
            if !record.alive || !record.entity.is_a(EntityKind::System) {
                continue;
            }
            let Some(system) = systems.get_mut(record.entity) else {
                continue;
            };
            let SystemRecord {
                callback,
                components,
            } = system;
            match query::run(entities, storages, components, &mut **callback) {
                Ok(matched) => trace!(system = ?record.entity, matched, "ran system"),
                Err(error) => {
                    warn!(system = ?record.entity, %error, "skipped system");
                    first_error.get_or_insert(error);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
