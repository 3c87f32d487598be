mod holder;
pub use holder::Holder;

mod managed_pool;
pub use managed_pool::ManagedPool;

mod deferred_tasks;
pub use deferred_tasks::DeferredTaskQueue;

mod bindless;
pub use bindless::BindlessTableCopyState;
pub use bindless::BindlessTablePublisher;

mod config;
pub use config::ResourceManagerConfig;

mod pooled_resource;
pub use pooled_resource::PooledResource;
pub use pooled_resource::ResourcePoolSet;

mod resource_manager;
pub use resource_manager::ResourceManager;
pub use resource_manager::ResourceManagerMetrics;
