use crate::KeelRawHandle;

/// A GPU sampler. The default value is the null sampler.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeelSampler {
    pub raw: KeelRawHandle,
}

impl KeelSampler {
    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}
