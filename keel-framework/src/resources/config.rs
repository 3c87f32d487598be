#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct ResourceManagerConfig {
    /// How many bindless table copies to rotate between
    pub bindless_table_copy_count: u32,

    /// Entries per binding in the bindless table before it first has to grow
    pub initial_bindless_table_capacity: u32,

    /// Upper limit of live objects in each pool. Should be derived from the device's limits.
    pub max_objects_per_pool: usize,

    /// Slots to reserve up front in each pool
    pub initial_pool_capacity: usize,
}

impl Default for ResourceManagerConfig {
    fn default() -> Self {
        ResourceManagerConfig {
            bindless_table_copy_count: crate::DEFAULT_BINDLESS_TABLE_COPY_COUNT,
            initial_bindless_table_capacity: 16,
            max_objects_per_pool: 1 << 20,
            initial_pool_capacity: 32,
        }
    }
}
