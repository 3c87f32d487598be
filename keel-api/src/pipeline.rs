use crate::{KeelPipelineType, KeelRawHandle};

/// A render or compute pipeline. The default value is the null pipeline.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeelPipeline {
    pub raw: KeelRawHandle,
    pub pipeline_type: KeelPipelineType,
}

impl KeelPipeline {
    pub fn pipeline_type(&self) -> KeelPipelineType {
        self.pipeline_type
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}
