//! # Entity Component System
//!
//! A sparse-set ECS where everything is an entity.
//!
//! ## Design Philosophy
//!
//! - Entity handles are 64-bit values: slot, generation and kind
//! - Each component type owns one sparse set and one dense byte buffer,
//!   kept in lockstep by swap-removal
//! - Component types, systems and prefabs are entities themselves
//! - Queries walk the entity table in slot order and hand out borrowed views

mod component;
mod entity;
mod query;
mod relation;
mod sparse;
mod storage;
mod system;
mod world;

pub use component::{Component, Prefab, Relation};
pub use entity::{Entity, EntityKind, EntityRecord, NIL_SLOT};
pub use query::View;
pub use sparse::SparseSet;
pub use storage::{Column, ComponentStorage};
pub use system::{SystemFn, SystemRecord};
pub use world::World;
