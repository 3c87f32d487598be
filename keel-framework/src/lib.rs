//! A mid-level framework for GPU resource lifetime management. Provides owning handles for GPU
//! objects, defers destroying them until the GPU has retired every submission that could reference
//! them, and keeps a bindless descriptor table in sync with the live resources.

mod resources;
pub use resources::*;

pub use keel_api::KeelResult;
pub use keel_base::slab::Handle;

/// Number of bindless table copies rotated between by default. The CPU can run this many
/// table rebuilds ahead of the GPU before it has to wait.
pub const DEFAULT_BINDLESS_TABLE_COPY_COUNT: u32 = 3;
