use crossbeam_channel::Sender;
use keel_base::slab::Handle;

/// Owns the right to eventually free a handle in the pool that created it.
///
/// Dropping the holder (or calling `reset`) sends the handle back to its pool. The pool turns it
/// into a deferred release, so the object stays alive until the GPU retires everything that was
/// submitted before the release. `Handle`s copied out of the holder may outlive it, they just stop
/// resolving once the slot is reclaimed.
pub struct Holder<T> {
    handle: Handle<T>,
    drop_tx: Option<Sender<Handle<T>>>,
}

impl<T> Holder<T> {
    pub(super) fn new(
        handle: Handle<T>,
        drop_tx: Sender<Handle<T>>,
    ) -> Self {
        Holder {
            handle,
            drop_tx: Some(drop_tx),
        }
    }

    /// A holder that owns nothing. Dropping it is a no-op.
    pub fn empty() -> Self {
        Holder {
            handle: Handle::empty(),
            drop_tx: None,
        }
    }

    pub fn handle(&self) -> Handle<T> {
        self.handle
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    /// Release the object now instead of waiting for the holder to drop. The holder is left empty.
    pub fn reset(&mut self) {
        let handle = std::mem::take(&mut self.handle);
        if let Some(drop_tx) = self.drop_tx.take() {
            if !handle.is_empty() {
                // Not a problem if the rx closed, the pool is gone and so is the object
                let _ = drop_tx.send(handle);
            }
        }
    }

    /// Give up ownership without releasing. The caller becomes responsible for passing the handle
    /// to `ResourceManager::release`.
    pub fn detach(mut self) -> Handle<T> {
        self.drop_tx = None;
        std::mem::take(&mut self.handle)
    }
}

impl<T> Default for Holder<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Drop for Holder<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> std::fmt::Debug for Holder<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Holder")
            .field("handle", &self.handle)
            .finish()
    }
}
