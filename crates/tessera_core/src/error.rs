//! # ECS Error Types
//!
//! All errors that can occur while operating on a [`World`](crate::World).
//!
//! Every contract check the world performs reports through [`EcsError`];
//! nothing in the library aborts on a bad handle.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur in the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Handle is stale, out of range or nil.
    #[error("invalid entity handle: {0:?}")]
    InvalidEntity(Entity),

    /// Component type has no backing storage.
    #[error("no storage registered for component type {0:?}")]
    MissingStorage(Entity),

    /// Entity does not carry the component.
    #[error("entity {entity:?} does not have component {component:?}")]
    MissingComponent {
        /// The entity that was inspected.
        entity: Entity,
        /// The component type it lacks.
        component: Entity,
    },

    /// Entity carries no relation pair.
    #[error("entity {0:?} has no relation")]
    NoRelation(Entity),

    /// Handle was expected to be a component (or tag) type.
    #[error("{0:?} is not a component type")]
    NotAComponentType(Entity),

    /// Handle was expected to be a plain entity.
    #[error("{0:?} is not a plain entity")]
    NotAPlainEntity(Entity),

    /// Component type cannot be attached with `attach`.
    #[error("{0:?} cannot be attached directly")]
    NotAttachable(Entity),

    /// Built-in component types cannot be despawned.
    #[error("{0:?} is a built-in component type")]
    BuiltinComponent(Entity),

    /// Supplied data does not match the component's element size.
    #[error("size mismatch for component {component:?}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// The component type.
        component: Entity,
        /// Registered element size.
        expected: usize,
        /// Size that was supplied.
        actual: usize,
    },

    /// A component type was listed more than once.
    #[error("component {0:?} listed more than once")]
    DuplicateComponent(Entity),

    /// The world's entity limit was reached.
    #[error("entity capacity exceeded: limit {limit}")]
    CapacityExceeded {
        /// Configured maximum.
        limit: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
