use crate::{KeelExtents3D, KeelRawHandle, KeelResourceType, KeelSampleCount};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeelTextureDef {
    pub extents: KeelExtents3D,
    pub sample_count: KeelSampleCount,
    pub resource_type: KeelResourceType,
}

impl Default for KeelTextureDef {
    fn default() -> Self {
        KeelTextureDef {
            extents: KeelExtents3D {
                width: 1,
                height: 1,
                depth: 1,
            },
            sample_count: KeelSampleCount::SampleCount1,
            resource_type: KeelResourceType::TEXTURE,
        }
    }
}

/// A GPU image and its default view. The default value is the null texture.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeelTexture {
    /// The view shaders should read through
    pub raw: KeelRawHandle,
    pub texture_def: KeelTextureDef,
}

impl KeelTexture {
    pub fn texture_def(&self) -> &KeelTextureDef {
        &self.texture_def
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    // Multisampled images cannot be directly accessed from shaders
    fn is_shader_accessible(&self) -> bool {
        !self.is_null() && self.texture_def.sample_count.as_u32() == 1
    }

    pub fn is_sampled_image(&self) -> bool {
        self.is_shader_accessible()
            && self
                .texture_def
                .resource_type
                .contains(KeelResourceType::TEXTURE)
    }

    pub fn is_storage_image(&self) -> bool {
        self.is_shader_accessible()
            && self
                .texture_def
                .resource_type
                .contains(KeelResourceType::TEXTURE_READ_WRITE)
    }
}
