use crate::{KeelRawHandle, KeelResourceType};

#[derive(Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeelBufferDef {
    pub size: u64,
    pub resource_type: KeelResourceType,
}

/// A GPU buffer. The default value is the null buffer.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeelBuffer {
    pub raw: KeelRawHandle,
    pub buffer_def: KeelBufferDef,
}

impl KeelBuffer {
    pub fn buffer_def(&self) -> &KeelBufferDef {
        &self.buffer_def
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}
