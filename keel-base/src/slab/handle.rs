use super::{GenerationCounterT, SlabIndexT};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// An index into a `Pool<T>` plus the generation of the slot at the time the object was created.
///
/// Generation 0 is never assigned to a live object, so `Handle::default()` is the empty handle.
/// `T` is only a tag that keeps handles of different pools from being mixed up.
pub struct Handle<T> {
    index: SlabIndexT,
    generation: GenerationCounterT,
    phantom_data: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(super) fn new(
        index: SlabIndexT,
        generation: GenerationCounterT,
    ) -> Self {
        debug_assert!(generation != 0, "generation 0 is reserved for empty handles");
        Handle {
            index,
            generation,
            phantom_data: PhantomData,
        }
    }

    /// The handle that never resolves to anything
    pub const fn empty() -> Self {
        Handle {
            index: 0,
            generation: 0,
            phantom_data: PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.generation == 0
    }

    pub fn index(&self) -> SlabIndexT {
        self.index
    }

    pub fn generation(&self) -> GenerationCounterT {
        self.generation
    }

    /// Pack into 64 bits, generation in the high half. Useful for passing handles through
    /// untyped channels (push constants, debug names, etc.)
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    pub fn from_bits(bits: u64) -> Self {
        Handle {
            index: bits as u32,
            generation: (bits >> 32) as u32,
            phantom_data: PhantomData,
        }
    }
}

// Implemented by hand so that T doesn't need to be Clone/Eq/etc.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.to_bits().hash(state);
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("type", &core::any::type_name::<T>())
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Texture;
    struct Sampler;

    #[test]
    fn test_default_is_empty() {
        let handle = Handle::<Texture>::default();
        assert!(handle.is_empty());
        assert_eq!(handle, Handle::empty());
    }

    #[test]
    fn test_equality_needs_both_fields() {
        let a = Handle::<Texture>::new(3, 1);
        assert_eq!(a, Handle::new(3, 1));
        assert_ne!(a, Handle::new(3, 2));
        assert_ne!(a, Handle::new(4, 1));
    }

    #[test]
    fn test_bits() {
        let handle = Handle::<Sampler>::new(7, 12);
        assert_eq!(handle.to_bits(), (12u64 << 32) | 7);
        let unpacked = Handle::<Sampler>::from_bits(handle.to_bits());
        assert_eq!(unpacked.index(), 7);
        assert_eq!(unpacked.generation(), 12);
        assert!(Handle::<Sampler>::from_bits(0).is_empty());
    }

    #[test]
    fn test_handle_is_copy_without_bounds_on_t() {
        // Texture is neither Clone nor Copy
        let a = Handle::<Texture>::new(0, 1);
        let b = a;
        assert_eq!(a, b);
    }
}
