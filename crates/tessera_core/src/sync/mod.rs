//! # Sharing a World Across Threads
//!
//! A [`World`](crate::World) is single-threaded: queries and systems borrow
//! its storages mutably for their whole run. Threads that need the same world
//! go through [`SharedWorld`], which serializes every access behind one
//! `parking_lot` mutex.
//!
//! ```text
//! Thread 1 (logic):   lock -> spawn / set / step -> unlock
//! Thread 2 (tooling): lock -> query              -> unlock
//! ```

mod shared_world;

pub use shared_world::SharedWorld;
