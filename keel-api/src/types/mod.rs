mod misc;
pub use misc::*;
