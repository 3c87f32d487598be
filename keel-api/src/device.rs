use crate::{
    KeelBuffer, KeelPipeline, KeelRawHandle, KeelResult, KeelSampler, KeelShaderModule,
    KeelTexture,
};

/// Any object the backend may be asked to destroy
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeelNativeObject {
    Buffer(KeelBuffer),
    Texture(KeelTexture),
    Sampler(KeelSampler),
    ShaderModule(KeelShaderModule),
    Pipeline(KeelPipeline),
}

impl KeelNativeObject {
    pub fn raw(&self) -> KeelRawHandle {
        match self {
            KeelNativeObject::Buffer(x) => x.raw,
            KeelNativeObject::Texture(x) => x.raw,
            KeelNativeObject::Sampler(x) => x.raw,
            KeelNativeObject::ShaderModule(x) => x.raw,
            KeelNativeObject::Pipeline(x) => x.raw,
        }
    }

    pub fn is_null(&self) -> bool {
        self.raw().is_null()
    }
}

impl From<KeelBuffer> for KeelNativeObject {
    fn from(buffer: KeelBuffer) -> Self {
        KeelNativeObject::Buffer(buffer)
    }
}

impl From<KeelTexture> for KeelNativeObject {
    fn from(texture: KeelTexture) -> Self {
        KeelNativeObject::Texture(texture)
    }
}

impl From<KeelSampler> for KeelNativeObject {
    fn from(sampler: KeelSampler) -> Self {
        KeelNativeObject::Sampler(sampler)
    }
}

impl From<KeelShaderModule> for KeelNativeObject {
    fn from(shader_module: KeelShaderModule) -> Self {
        KeelNativeObject::ShaderModule(shader_module)
    }
}

impl From<KeelPipeline> for KeelNativeObject {
    fn from(pipeline: KeelPipeline) -> Self {
        KeelNativeObject::Pipeline(pipeline)
    }
}

/// Full contents of one bindless table copy, indexed by pool slot. All three arrays have the same
/// length and unused entries hold the dummy object.
#[derive(Debug)]
pub struct KeelBindlessTableWrite<'a> {
    pub sampled_textures: &'a [KeelRawHandle],
    pub storage_textures: &'a [KeelRawHandle],
    pub samplers: &'a [KeelRawHandle],
}

/// Backend operations the lifetime layer needs
pub trait KeelDevice: Send + Sync {
    /// Destroy the native object. Only called once the GPU no longer references it.
    fn destroy_native(
        &self,
        object: KeelNativeObject,
    );

    /// Overwrite one copy of the bindless table and make it the one bound by subsequently recorded
    /// commands. Only called when no in-flight submission reads that copy.
    fn update_bindless_table(
        &self,
        copy_index: u32,
        write: &KeelBindlessTableWrite,
    ) -> KeelResult<()>;
}
