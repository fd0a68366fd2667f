//! # Shared World Handle
//!
//! Cloneable handle to one world guarded by a mutex.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::trace;

use crate::ecs::World;
use crate::error::EcsResult;

/// Thread-safe handle to a [`World`].
///
/// Cloning the handle shares the world; it never copies it.
///
/// ## Usage
///
/// ```rust
/// use tessera_core::{SharedWorld, World};
///
/// let shared = SharedWorld::new(World::new());
/// let worker = shared.clone();
///
/// std::thread::spawn(move || {
///     worker.with(|world| world.spawn()).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(shared.lock().alive_count(), World::BUILTIN_COUNT + 1);
/// ```
#[derive(Clone, Default)]
pub struct SharedWorld {
    inner: Arc<Mutex<World>>,
}

impl SharedWorld {
    /// Wraps `world` for shared access.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Locks the world, blocking until it is available.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, World> {
        self.inner.lock()
    }

    /// Locks the world without blocking.
    #[inline]
    #[must_use]
    pub fn try_lock(&self) -> Option<MutexGuard<'_, World>> {
        self.inner.try_lock()
    }

    /// Runs `f` with exclusive access to the world.
    pub fn with<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    /// Runs every registered system once under the lock.
    ///
    /// # Errors
    ///
    /// Same as [`World::step`].
    pub fn step(&self) -> EcsResult<()> {
        let mut world = self.inner.lock();
        trace!(alive = world.alive_count(), "stepping shared world");
        world.step()
    }

    /// Number of handles sharing this world.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl From<World> for SharedWorld {
    fn from(world: World) -> Self {
        Self::new(world)
    }
}
