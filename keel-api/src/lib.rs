//! The contract `keel` consumes from a graphics backend.
//!
//! A backend provides two things:
//!  * A `KeelSubmissionTracker` that hands out monotonically increasing `KeelSubmissionId`s and can
//!    report or wait for their retirement on the GPU
//!  * A `KeelDevice` that can destroy native objects and upload bindless descriptor tables
//!
//! The resource types in this crate (`KeelBuffer`, `KeelTexture`, etc.) are plain values that wrap
//! a backend-native handle. Their `Default` is the null object, which is what free slots in a pool
//! hold.
//!
//! A deterministic software backend is provided in `sim`. It doesn't render anything, but it
//! models in-flight submissions faithfully enough to validate lifetime bugs.

pub use buffer::*;
pub use device::*;
pub use error::*;
pub use pipeline::*;
pub use sampler::*;
pub use shader_module::*;
pub use submission::*;
pub use texture::*;
pub use types::*;

mod buffer;
mod device;
mod error;
mod pipeline;
mod sampler;
mod shader_module;
mod submission;
mod texture;
mod types;

mod backends;
pub use backends::sim;
