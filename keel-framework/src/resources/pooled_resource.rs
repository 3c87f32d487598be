use super::{BindlessTablePublisher, Holder, ManagedPool, ResourceManagerConfig};
use keel_api::{
    KeelBuffer, KeelDevice, KeelNativeObject, KeelPipeline, KeelResult, KeelSampler,
    KeelShaderModule, KeelSubmissionTracker, KeelTexture,
};
use keel_base::slab::Handle;
use std::sync::Arc;

/// A native resource type that lives in one of the pools of a `ResourcePoolSet`
pub trait PooledResource: Default + Into<KeelNativeObject> + Send + 'static {
    /// Creating or destroying one of these changes the bindless table
    const BINDLESS: bool;

    fn pool(pools: &ResourcePoolSet) -> &ManagedPool<Self>;
    fn pool_mut(pools: &mut ResourcePoolSet) -> &mut ManagedPool<Self>;
}

impl PooledResource for KeelBuffer {
    const BINDLESS: bool = false;

    fn pool(pools: &ResourcePoolSet) -> &ManagedPool<Self> {
        &pools.buffers
    }

    fn pool_mut(pools: &mut ResourcePoolSet) -> &mut ManagedPool<Self> {
        &mut pools.buffers
    }
}

impl PooledResource for KeelTexture {
    const BINDLESS: bool = true;

    fn pool(pools: &ResourcePoolSet) -> &ManagedPool<Self> {
        &pools.textures
    }

    fn pool_mut(pools: &mut ResourcePoolSet) -> &mut ManagedPool<Self> {
        &mut pools.textures
    }
}

impl PooledResource for KeelSampler {
    const BINDLESS: bool = true;

    fn pool(pools: &ResourcePoolSet) -> &ManagedPool<Self> {
        &pools.samplers
    }

    fn pool_mut(pools: &mut ResourcePoolSet) -> &mut ManagedPool<Self> {
        &mut pools.samplers
    }
}

impl PooledResource for KeelShaderModule {
    const BINDLESS: bool = false;

    fn pool(pools: &ResourcePoolSet) -> &ManagedPool<Self> {
        &pools.shader_modules
    }

    fn pool_mut(pools: &mut ResourcePoolSet) -> &mut ManagedPool<Self> {
        &mut pools.shader_modules
    }
}

// Render and compute pipelines share a pool, KeelPipeline::pipeline_type tells them apart
impl PooledResource for KeelPipeline {
    const BINDLESS: bool = false;

    fn pool(pools: &ResourcePoolSet) -> &ManagedPool<Self> {
        &pools.pipelines
    }

    fn pool_mut(pools: &mut ResourcePoolSet) -> &mut ManagedPool<Self> {
        &mut pools.pipelines
    }
}

/// Every pool of native objects plus the bindless table that mirrors the textures and samplers.
/// This is the state deferred destroys operate on.
pub struct ResourcePoolSet {
    device: Arc<dyn KeelDevice>,
    buffers: ManagedPool<KeelBuffer>,
    textures: ManagedPool<KeelTexture>,
    samplers: ManagedPool<KeelSampler>,
    shader_modules: ManagedPool<KeelShaderModule>,
    pipelines: ManagedPool<KeelPipeline>,
    bindless: BindlessTablePublisher,
}

impl ResourcePoolSet {
    pub fn new(
        device: Arc<dyn KeelDevice>,
        config: &ResourceManagerConfig,
    ) -> Self {
        let capacity = config.initial_pool_capacity;
        let max_objects = config.max_objects_per_pool;

        ResourcePoolSet {
            device,
            buffers: ManagedPool::new(capacity, max_objects),
            textures: ManagedPool::new(capacity, max_objects),
            samplers: ManagedPool::new(capacity, max_objects),
            shader_modules: ManagedPool::new(capacity, max_objects),
            pipelines: ManagedPool::new(capacity, max_objects),
            bindless: BindlessTablePublisher::new(
                config.bindless_table_copy_count,
                config.initial_bindless_table_capacity,
            ),
        }
    }

    pub fn device(&self) -> &Arc<dyn KeelDevice> {
        &self.device
    }

    pub fn pool<T: PooledResource>(&self) -> &ManagedPool<T> {
        T::pool(self)
    }

    pub fn get<T: PooledResource>(
        &self,
        handle: Handle<T>,
    ) -> Option<&T> {
        T::pool(self).get(handle)
    }

    pub fn insert<T: PooledResource>(
        &mut self,
        object: T,
    ) -> Holder<T> {
        let holder = T::pool_mut(self).insert(object);
        log::trace!(
            "Created {} {:?}",
            core::any::type_name::<T>(),
            holder.handle()
        );

        if T::BINDLESS {
            self.bindless.mark_dirty();
        }

        holder
    }

    /// Insert an object no holder will ever release
    pub fn insert_unmanaged<T: PooledResource>(
        &mut self,
        object: T,
    ) -> Handle<T> {
        if T::BINDLESS {
            self.bindless.mark_dirty();
        }

        T::pool_mut(self).insert_unmanaged(object)
    }

    /// Remove the object from its pool and destroy the native object. Only call this once the GPU
    /// can no longer reference it.
    pub fn destroy<T: PooledResource>(
        &mut self,
        handle: Handle<T>,
    ) {
        let object = match T::pool_mut(self).pool_mut().destroy(handle) {
            Some(object) => object,
            None => return,
        };

        log::trace!(
            "Destroying {} {:?}",
            core::any::type_name::<T>(),
            handle
        );

        if T::BINDLESS {
            self.bindless.mark_dirty();
        }

        let native: KeelNativeObject = object.into();
        if !native.is_null() {
            self.device.destroy_native(native);
        }
    }

    /// Destroy every live object in every pool. Only for teardown with an idle GPU. Slot 0 of the
    /// texture and sampler pools holds the bindless dummies, those are destroyed last.
    pub fn destroy_all(&mut self) {
        let dummy_texture = self.textures.pool().handle_at(0);
        let dummy_sampler = self.samplers.pool().handle_at(0);

        self.destroy_all_in_pool::<KeelPipeline>(Handle::empty());
        self.destroy_all_in_pool::<KeelShaderModule>(Handle::empty());
        self.destroy_all_in_pool::<KeelSampler>(dummy_sampler);
        self.destroy_all_in_pool::<KeelTexture>(dummy_texture);
        self.destroy_all_in_pool::<KeelBuffer>(Handle::empty());

        self.destroy(dummy_sampler);
        self.destroy(dummy_texture);

        self.buffers.pool_mut().clear();
        self.textures.pool_mut().clear();
        self.samplers.pool_mut().clear();
        self.shader_modules.pool_mut().clear();
        self.pipelines.pool_mut().clear();
    }

    fn destroy_all_in_pool<T: PooledResource>(
        &mut self,
        keep: Handle<T>,
    ) {
        let handles: Vec<_> = T::pool(self)
            .pool()
            .iter()
            .map(|(handle, _)| handle)
            .filter(|handle| *handle != keep)
            .collect();

        for handle in handles {
            self.destroy(handle);
        }
    }

    pub fn bindless(&self) -> &BindlessTablePublisher {
        &self.bindless
    }

    pub fn bindless_mut(&mut self) -> &mut BindlessTablePublisher {
        &mut self.bindless
    }

    pub fn publish_bindless_if_dirty(
        &mut self,
        tracker: &mut dyn KeelSubmissionTracker,
    ) -> KeelResult<bool> {
        self.bindless.publish_if_dirty(
            self.textures.pool(),
            self.samplers.pool(),
            &*self.device,
            tracker,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_api::sim::KeelSimDevice;
    use keel_api::{KeelBufferDef, KeelTextureDef};

    fn make_pools() -> (KeelSimDevice, ResourcePoolSet) {
        let device = KeelSimDevice::new();
        let pools = ResourcePoolSet::new(
            Arc::new(device.clone()),
            &ResourceManagerConfig::default(),
        );
        (device, pools)
    }

    #[test]
    fn test_destroy_destroys_native_object() {
        let (device, mut pools) = make_pools();
        let buffer = device.create_buffer(&KeelBufferDef::default()).unwrap();
        let raw = buffer.raw;

        let holder = pools.insert(buffer);
        let handle = holder.detach();
        assert!(device.is_live(raw));

        pools.destroy(handle);
        assert!(!device.is_live(raw));
        assert!(pools.get(handle).is_none());
        assert_eq!(0, device.invalid_destroy_count());
    }

    #[test]
    fn test_null_objects_are_not_sent_to_device() {
        let (device, mut pools) = make_pools();
        let handle = pools.insert_unmanaged(KeelSampler::default());
        pools.destroy(handle);
        assert!(device.destroyed_objects().is_empty());
    }

    #[test]
    fn test_bindless_types_mark_dirty() {
        let (device, mut pools) = make_pools();
        let mut queue = device.create_queue(3);
        pools.publish_bindless_if_dirty(&mut queue).unwrap();
        assert!(!pools.bindless().is_dirty());

        let buffer = pools.insert(device.create_buffer(&KeelBufferDef::default()).unwrap());
        assert!(!pools.bindless().is_dirty());
        pools.destroy(buffer.detach());
        assert!(!pools.bindless().is_dirty());

        let texture = pools.insert(device.create_texture(&KeelTextureDef::default()).unwrap());
        assert!(pools.bindless().is_dirty());
        pools.publish_bindless_if_dirty(&mut queue).unwrap();

        pools.destroy(texture.detach());
        assert!(pools.bindless().is_dirty());
    }

    #[test]
    fn test_destroy_all() {
        let (device, mut pools) = make_pools();
        let _buffer = pools.insert(device.create_buffer(&KeelBufferDef::default()).unwrap());
        let _texture = pools.insert(device.create_texture(&KeelTextureDef::default()).unwrap());
        assert_eq!(2, device.live_object_count());

        pools.destroy_all();
        assert_eq!(0, device.live_object_count());
        assert_eq!(0, pools.pool::<KeelBuffer>().num_objects());
        assert_eq!(0, pools.pool::<KeelTexture>().num_objects());
    }

    #[test]
    fn test_destroy_all_destroys_dummies_last() {
        let (device, mut pools) = make_pools();
        let dummy_texture = device.create_texture(&KeelTextureDef::default()).unwrap();
        let dummy_sampler = device.create_sampler().unwrap();
        let dummy_texture_raw = dummy_texture.raw;
        let dummy_sampler_raw = dummy_sampler.raw;
        pools.insert_unmanaged(dummy_texture);
        pools.insert_unmanaged(dummy_sampler);

        let _texture = pools.insert(device.create_texture(&KeelTextureDef::default()).unwrap());
        let _sampler = pools.insert(device.create_sampler().unwrap());
        let _buffer = pools.insert(device.create_buffer(&KeelBufferDef::default()).unwrap());

        pools.destroy_all();
        let destroyed: Vec<_> = device
            .destroyed_objects()
            .iter()
            .map(|x| x.raw())
            .collect();
        assert_eq!(5, destroyed.len());
        assert_eq!(
            &[dummy_sampler_raw, dummy_texture_raw],
            &destroyed[3..]
        );
        assert_eq!(0, device.live_object_count());
        assert_eq!(0, device.invalid_destroy_count());
    }
}
