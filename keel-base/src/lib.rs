//! Lowest level crate of `keel`. Backend-agnostic handles and slot storage.

pub mod slab;
