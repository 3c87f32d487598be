//! Generation-checked storage for objects that are referenced by plain-old-data handles.
//!
//! A `Pool<T>` is the single owner of every `T` inserted into it. Everything else refers to the
//! objects by `Handle<T>`, which is `Copy` and may outlive the object it names. A stale handle
//! simply fails to resolve.

/// Scalar type for tracking slot generation
///
/// u32 is enough, even at 120fps with one allocation per frame in the same slot it would take
/// more than a year to exhaust. Wraparound is not handled.
pub type GenerationCounterT = u32;

/// Scalar type for the index of a slot
pub type SlabIndexT = u32;

mod handle;
pub use handle::Handle;

mod pool;
pub use pool::Pool;
