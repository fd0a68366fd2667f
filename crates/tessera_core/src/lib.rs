//! # Tessera Core
//!
//! A small Entity Component System runtime:
//! - Generational 64-bit entity handles with a kind tag
//! - Sparse-set component storage over type-erased bytes
//! - Relation pairs, prefabs and registered systems
//!
//! ## Architecture Rules
//!
//! 1. **Everything is an entity** - component types, systems and prefabs
//!    live in the same table as plain entities
//! 2. **Dense storage** - component bytes are packed, removal swaps in the last
//!    element
//! 3. **Handles are checked** - every operation validates its handles and
//!    reports a stale one as an error
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::World;
//!
//! let mut world = World::new();
//! let position = world.register::<[f32; 2]>().unwrap();
//! let velocity = world.register::<[f32; 2]>().unwrap();
//!
//! let entity = world.spawn().unwrap();
//! world.set_as(entity, position, &[0.0f32, 0.0]).unwrap();
//! world.set_as(entity, velocity, &[1.0f32, 0.5]).unwrap();
//!
//! world
//!     .register_system(&[position, velocity], |view| {
//!         let vel = view.read::<[f32; 2]>(1).unwrap_or_default();
//!         if let Some(pos) = view.field_mut::<[f32; 2]>(0) {
//!             pos[0] += vel[0];
//!             pos[1] += vel[1];
//!         }
//!     })
//!     .unwrap();
//!
//! world.step().unwrap();
//! assert_eq!(
//!     world.get_as::<[f32; 2]>(entity, position).unwrap(),
//!     Some([1.0, 0.5])
//! );
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod sync;

pub use config::WorldConfig;
pub use ecs::{
    Column, Component, ComponentStorage, Entity, EntityKind, EntityRecord, Prefab, Relation,
    SparseSet, SystemFn, SystemRecord, View, World, NIL_SLOT,
};
pub use error::{EcsError, EcsResult};
pub use sync::SharedWorld;
