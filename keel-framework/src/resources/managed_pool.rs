use super::Holder;
use crossbeam_channel::{Receiver, Sender};
use keel_base::slab::{Handle, Pool};

/// A `Pool` whose objects are handed out wrapped in `Holder`s. Dropped holders send their handle
/// back over a channel, `take_released` collects them.
pub struct ManagedPool<T> {
    pool: Pool<T>,
    drop_tx: Sender<Handle<T>>,
    drop_rx: Receiver<Handle<T>>,
    max_objects: usize,
}

impl<T: Default> ManagedPool<T> {
    pub fn new(
        initial_capacity: usize,
        max_objects: usize,
    ) -> Self {
        let (drop_tx, drop_rx) = crossbeam_channel::unbounded();
        ManagedPool {
            pool: Pool::with_capacity(initial_capacity),
            drop_tx,
            drop_rx,
            max_objects,
        }
    }

    /// Insert an object and return the holder that owns it. Exceeding the configured maximum live
    /// object count is a logic error in the caller, which should have checked device limits.
    pub fn insert(
        &mut self,
        object: T,
    ) -> Holder<T> {
        let handle = self.insert_unmanaged(object);
        Holder::new(handle, self.drop_tx.clone())
    }

    /// Insert an object without a holder. Nothing will ever release it automatically.
    pub fn insert_unmanaged(
        &mut self,
        object: T,
    ) -> Handle<T> {
        assert!(
            self.pool.num_objects() < self.max_objects,
            "{} pool exceeded its maximum of {} live objects",
            core::any::type_name::<T>(),
            self.max_objects
        );

        self.pool.create(object)
    }

    pub fn get(
        &self,
        handle: Handle<T>,
    ) -> Option<&T> {
        self.pool.get(handle)
    }

    pub fn get_mut(
        &mut self,
        handle: Handle<T>,
    ) -> Option<&mut T> {
        self.pool.get_mut(handle)
    }

    /// Handles of all holders dropped since the last call
    pub fn take_released(&self) -> Vec<Handle<T>> {
        self.drop_rx.try_iter().collect()
    }

    pub fn pool(&self) -> &Pool<T> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool<T> {
        &mut self.pool
    }

    pub fn num_objects(&self) -> usize {
        self.pool.num_objects()
    }
}
