use crate::KeelRawHandle;

/// Compiled shader code. The default value is the null module.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeelShaderModule {
    pub raw: KeelRawHandle,
}

impl KeelShaderModule {
    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}
