pub use keel_base as base;

pub use keel_api as api;

#[cfg(feature = "framework")]
pub use keel_framework as framework;
