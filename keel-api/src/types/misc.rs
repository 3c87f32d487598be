#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// A backend-native object handle (VkImageView, VkSampler, MTLBuffer pointer, etc.) squeezed into
/// 64 bits. Zero is the null object.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeelRawHandle(pub u64);

impl KeelRawHandle {
    pub const NULL: KeelRawHandle = KeelRawHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A 3d size for textures
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KeelExtents3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// Number of MSAA samples to use
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KeelSampleCount {
    SampleCount1,
    SampleCount2,
    SampleCount4,
    SampleCount8,
    SampleCount16,
}

impl Default for KeelSampleCount {
    fn default() -> Self {
        KeelSampleCount::SampleCount1
    }
}

impl KeelSampleCount {
    pub fn as_u32(self) -> u32 {
        match self {
            KeelSampleCount::SampleCount1 => 1,
            KeelSampleCount::SampleCount2 => 2,
            KeelSampleCount::SampleCount4 => 4,
            KeelSampleCount::SampleCount8 => 8,
            KeelSampleCount::SampleCount16 => 16,
        }
    }
}

bitflags::bitflags! {
    /// Indicates how a resource will be used. In some cases, multiple flags are allowed.
    #[derive(Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct KeelResourceType: u32 {
        const UNDEFINED = 0;
        const SAMPLER = 1<<0;
        /// Sampled image. Textures with this flag are exposed in the bindless sampled texture table
        const TEXTURE = 1<<1;
        /// Storage image. Textures with this flag are exposed in the bindless storage texture table
        const TEXTURE_READ_WRITE = 1<<2;
        const BUFFER = 1<<3;
        const BUFFER_READ_WRITE = 1<<5;
        const UNIFORM_BUFFER = 1<<7;
        const VERTEX_BUFFER = 1<<9;
        const INDEX_BUFFER = 1<<10;
        const INDIRECT_BUFFER = 1<<11;
        const RENDER_TARGET_COLOR = 1<<13;
        const RENDER_TARGET_DEPTH_STENCIL = 1<<14;
    }
}

/// Render or compute
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KeelPipelineType {
    Graphics,
    Compute,
}

impl Default for KeelPipelineType {
    fn default() -> Self {
        KeelPipelineType::Graphics
    }
}
