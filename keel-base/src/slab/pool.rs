use super::{GenerationCounterT, Handle, SlabIndexT};

struct Slot<T> {
    object: T,

    // Starts at 1 and increments every time the slot is freed. Never reset, so every tenant of an
    // index has a distinct generation
    generation: GenerationCounterT,

    // Link to the next free slot. Only meaningful while the slot is on the free list
    next_free: Option<SlabIndexT>,

    occupied: bool,
}

/// A growable array of slots with an intrusive free list. `T::default()` is the placeholder value
/// stored in free slots.
///
/// Lookups never fail loudly. A handle that is empty, out of range, or from an older generation
/// resolves to `None`, which callers should treat as "already gone".
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<SlabIndexT>,
    num_objects: usize,
}

impl<T: Default> Default for Pool<T> {
    fn default() -> Self {
        Self::with_capacity(32)
    }
}

impl<T: Default> Pool<T> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Pool {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            num_objects: 0,
        }
    }

    /// Insert an object. Reuses the most recently freed slot if there is one, otherwise appends.
    pub fn create(
        &mut self,
        object: T,
    ) -> Handle<T> {
        self.num_objects += 1;

        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            debug_assert!(!slot.occupied);

            // The generation was already bumped when the slot was freed
            self.free_head = slot.next_free.take();
            slot.object = object;
            slot.occupied = true;
            return Handle::new(index, slot.generation);
        }

        let index = self.slots.len() as SlabIndexT;
        self.slots.push(Slot {
            object,
            generation: 1,
            next_free: None,
            occupied: true,
        });

        Handle::new(index, 1)
    }

    fn slot_index(
        &self,
        handle: Handle<T>,
    ) -> Option<usize> {
        if handle.is_empty() {
            return None;
        }

        let index = handle.index() as usize;
        match self.slots.get(index) {
            Some(slot) if slot.occupied && slot.generation == handle.generation() => Some(index),
            _ => None,
        }
    }

    pub fn get(
        &self,
        handle: Handle<T>,
    ) -> Option<&T> {
        let index = self.slot_index(handle)?;
        Some(&self.slots[index].object)
    }

    pub fn get_mut(
        &mut self,
        handle: Handle<T>,
    ) -> Option<&mut T> {
        let index = self.slot_index(handle)?;
        Some(&mut self.slots[index].object)
    }

    pub fn exists(
        &self,
        handle: Handle<T>,
    ) -> bool {
        self.slot_index(handle).is_some()
    }

    /// Remove the object, replacing it with the placeholder, and return it so that any native
    /// resources it wraps can be destroyed. The slot goes to the head of the free list.
    ///
    /// An empty handle is ignored. Destroying an object twice is a logic error and asserts in
    /// debug builds.
    pub fn destroy(
        &mut self,
        handle: Handle<T>,
    ) -> Option<T> {
        if handle.is_empty() {
            return None;
        }

        let index = match self.slot_index(handle) {
            Some(index) => index,
            None => {
                debug_assert!(
                    false,
                    "tried to destroy {:?} which is already destroyed or was never created",
                    handle
                );
                return None;
            }
        };

        let free_head = self.free_head;
        let slot = &mut self.slots[index];
        let object = std::mem::take(&mut slot.object);
        slot.generation += 1;
        slot.next_free = free_head;
        slot.occupied = false;

        self.free_head = Some(index as SlabIndexT);
        self.num_objects -= 1;

        Some(object)
    }

    /// Handle to the live object at the given index, or the empty handle if the slot is free or
    /// out of range
    pub fn handle_at(
        &self,
        index: SlabIndexT,
    ) -> Handle<T> {
        match self.slots.get(index as usize) {
            Some(slot) if slot.occupied => Handle::new(index, slot.generation),
            _ => Handle::empty(),
        }
    }

    /// Number of live objects
    pub fn num_objects(&self) -> usize {
        self.num_objects
    }

    /// Number of slots, live or free. Indices of every handle ever returned are below this.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_objects == 0
    }

    /// Iterate all live objects
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.occupied)
            .map(|(index, slot)| (Handle::new(index as SlabIndexT, slot.generation), &slot.object))
    }

    /// Iterate every slot in index order. Free slots yield `None`.
    pub fn slots(&self) -> impl Iterator<Item = Option<&T>> {
        self.slots
            .iter()
            .map(|slot| if slot.occupied { Some(&slot.object) } else { None })
    }

    /// Drop every live object. Slots are kept and their generations bumped, so every outstanding
    /// handle goes stale. The free list is rebuilt in index order.
    pub fn clear(&mut self) {
        let mut free_head = None;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.occupied {
                slot.object = T::default();
                slot.generation += 1;
                slot.occupied = false;
            }

            slot.next_free = free_head;
            free_head = Some(index as SlabIndexT);
        }

        self.free_head = free_head;
        self.num_objects = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct TestStruct {
        value: u32,
    }

    impl TestStruct {
        fn new(value: u32) -> Self {
            TestStruct { value }
        }
    }

    #[test]
    fn test_create_get() {
        let mut pool = Pool::<TestStruct>::new();
        let handle = pool.create(TestStruct::new(123));

        assert_eq!(1, pool.num_objects());
        assert_eq!(1, handle.generation());
        assert_eq!(Some(&TestStruct::new(123)), pool.get(handle));
    }

    #[test]
    fn test_get_mut() {
        let mut pool = Pool::<TestStruct>::new();
        let handle = pool.create(TestStruct::new(1));
        pool.get_mut(handle).unwrap().value = 2;
        assert_eq!(2, pool.get(handle).unwrap().value);
    }

    #[test]
    fn test_lookup_failures() {
        let mut pool = Pool::<TestStruct>::new();
        assert!(pool.get(Handle::empty()).is_none());

        let handle = pool.create(TestStruct::new(1));
        assert!(pool.get(Handle::from_bits(handle.to_bits() + 100)).is_none());

        // Right index, future generation
        assert!(pool.get(Handle::new(handle.index(), 2)).is_none());
    }

    #[test]
    fn test_destroy_returns_object_and_leaves_placeholder() {
        let mut pool = Pool::<TestStruct>::new();
        let handle = pool.create(TestStruct::new(55));

        assert_eq!(Some(TestStruct::new(55)), pool.destroy(handle));
        assert_eq!(0, pool.num_objects());
        assert_eq!(1, pool.len());
        assert!(pool.get(handle).is_none());
        assert!(pool.handle_at(handle.index()).is_empty());
        assert_eq!(vec![None], pool.slots().collect::<Vec<_>>());
    }

    #[test]
    fn test_generation_isolation() {
        let mut pool = Pool::<TestStruct>::new();
        let h1 = pool.create(TestStruct::new(1));
        pool.destroy(h1);
        let h2 = pool.create(TestStruct::new(2));

        assert_eq!(h1.index(), h2.index());
        assert_eq!(h1.generation() + 1, h2.generation());
        assert!(pool.get(h1).is_none());
        assert_eq!(2, pool.get(h2).unwrap().value);
    }

    #[test]
    fn test_free_list_is_lifo() {
        let mut pool = Pool::<TestStruct>::new();
        let handles: Vec<_> = (0..5).map(|i| pool.create(TestStruct::new(i))).collect();

        pool.destroy(handles[1]);
        pool.destroy(handles[3]);

        assert_eq!(3, pool.create(TestStruct::new(10)).index());
        assert_eq!(1, pool.create(TestStruct::new(11)).index());
        assert_eq!(5, pool.create(TestStruct::new(12)).index());
        assert_eq!(6, pool.len());
    }

    #[test]
    fn test_iter_skips_free_slots() {
        let mut pool = Pool::<TestStruct>::new();
        let a = pool.create(TestStruct::new(0));
        let b = pool.create(TestStruct::new(1));
        let c = pool.create(TestStruct::new(2));
        pool.destroy(b);

        let live: Vec<_> = pool.iter().map(|(handle, value)| (handle, value.value)).collect();
        assert_eq!(vec![(a, 0), (c, 2)], live);
        assert_eq!(a, pool.handle_at(0));
        assert_eq!(c, pool.handle_at(2));
        assert!(pool.handle_at(99).is_empty());
    }

    #[test]
    fn test_destroy_empty_handle_is_ignored() {
        let mut pool = Pool::<TestStruct>::new();
        pool.create(TestStruct::new(0));
        assert!(pool.destroy(Handle::empty()).is_none());
        assert_eq!(1, pool.num_objects());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already destroyed")]
    fn test_double_destroy() {
        let mut pool = Pool::<TestStruct>::new();
        let handle = pool.create(TestStruct::new(0));
        pool.destroy(handle);
        pool.destroy(handle);
    }

    #[test]
    fn test_clear() {
        let mut pool = Pool::<TestStruct>::new();
        let handle = pool.create(TestStruct::new(0));
        pool.clear();
        assert_eq!(0, pool.num_objects());
        assert!(pool.get(handle).is_none());
    }

    #[test]
    fn test_handles_stay_stale_across_clear() {
        let mut pool = Pool::<TestStruct>::new();
        let old_a = pool.create(TestStruct::new(1));
        let old_b = pool.create(TestStruct::new(2));
        pool.destroy(old_b);
        pool.clear();
        assert_eq!(2, pool.len());

        let new_a = pool.create(TestStruct::new(3));
        let new_b = pool.create(TestStruct::new(4));
        assert_eq!(old_a.index(), new_a.index());
        assert_eq!(old_b.index(), new_b.index());
        assert_ne!(old_a, new_a);
        assert_ne!(old_b, new_b);
        assert!(pool.get(old_a).is_none());
        assert!(pool.get(old_b).is_none());
        assert_eq!(3, pool.get(new_a).unwrap().value);
        assert_eq!(2, pool.num_objects());
    }

    #[test]
    fn test_handle_matching_free_slot_generation_is_not_found() {
        let mut pool = Pool::<TestStruct>::new();
        let handle = pool.create(TestStruct::new(1));
        pool.destroy(handle);

        // Same index, generation the slot was bumped to when freed
        let forged = Handle::from_bits(Handle::<TestStruct>::new(handle.index(), 2).to_bits());
        assert!(pool.get(forged).is_none());
        assert!(!pool.exists(forged));
        assert!(pool.handle_at(handle.index()).is_empty());
    }

    #[test]
    fn test_many_create_destroy_cycles() {
        let mut pool = Pool::<TestStruct>::new();
        let mut handles = vec![];
        for i in 0..1000 {
            handles.push(pool.create(TestStruct::new(i)));
        }
        assert_eq!(1000, pool.num_objects());

        for handle in handles.iter().rev() {
            assert!(pool.destroy(*handle).is_some());
        }
        assert_eq!(0, pool.num_objects());
        assert_eq!(1000, pool.len());

        for handle in &handles {
            assert!(pool.get(*handle).is_none());
        }
    }
}
