use super::{
    BindlessTablePublisher, DeferredTaskQueue, Holder, PooledResource, ResourceManagerConfig,
    ResourcePoolSet,
};
use keel_api::{
    KeelBuffer, KeelDevice, KeelPipeline, KeelResult, KeelSampler, KeelShaderModule,
    KeelSubmissionId, KeelSubmissionTracker, KeelTexture,
};
use keel_base::slab::Handle;
use std::sync::Arc;

/// Live object counts. Texture and sampler counts include the dummy objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceManagerMetrics {
    pub buffer_count: usize,
    pub texture_count: usize,
    pub sampler_count: usize,
    pub shader_module_count: usize,
    pub pipeline_count: usize,
    pub pending_deferred_tasks: usize,
    pub bindless_table_rebuilds: u64,
}

/// Owns every native object created through it and destroys them once the GPU is done with them.
///
/// Objects are handed out as `Holder`s. Dropping a holder doesn't destroy anything immediately,
/// the release is picked up at the next submission boundary and tagged with the most recent
/// submission that could reference the object. Once that submission retires, the object is
/// destroyed and its slot becomes reusable.
///
/// Expected usage per frame is `begin_recording`, record commands using handles from `get`, then
/// `submit`. Only one recording session may be open at a time.
pub struct ResourceManager {
    pools: ResourcePoolSet,
    tracker: Box<dyn KeelSubmissionTracker>,
    deferred_tasks: DeferredTaskQueue<ResourcePoolSet>,
    dummy_texture: Handle<KeelTexture>,
    dummy_sampler: Handle<KeelSampler>,
    recording: bool,
    destroyed: bool,
}

impl ResourceManager {
    /// `dummy_texture` and `dummy_sampler` occupy slot 0 of their pools and are what the bindless
    /// table shows for every unused entry. The dummy texture should be usable both as a sampled and
    /// a storage image.
    pub fn new(
        device: Arc<dyn KeelDevice>,
        tracker: Box<dyn KeelSubmissionTracker>,
        dummy_texture: KeelTexture,
        dummy_sampler: KeelSampler,
        config: &ResourceManagerConfig,
    ) -> Self {
        assert!(!dummy_texture.is_null() && !dummy_sampler.raw.is_null());
        if !dummy_texture.is_sampled_image() || !dummy_texture.is_storage_image() {
            log::warn!(
                "Dummy texture {:?} cannot be both sampled and stored to, bindless table entries backed by it will be invalid for some accesses",
                dummy_texture.texture_def()
            );
        }

        let mut pools = ResourcePoolSet::new(device, config);
        let dummy_texture = pools.insert_unmanaged(dummy_texture);
        let dummy_sampler = pools.insert_unmanaged(dummy_sampler);
        debug_assert_eq!(0, dummy_texture.index());
        debug_assert_eq!(0, dummy_sampler.index());

        ResourceManager {
            pools,
            tracker,
            deferred_tasks: DeferredTaskQueue::new(),
            dummy_texture,
            dummy_sampler,
            recording: false,
            destroyed: false,
        }
    }

    pub fn device(&self) -> &Arc<dyn KeelDevice> {
        self.pools.device()
    }

    pub fn tracker(&self) -> &dyn KeelSubmissionTracker {
        &*self.tracker
    }

    pub fn pools(&self) -> &ResourcePoolSet {
        &self.pools
    }

    pub fn dummy_texture(&self) -> Handle<KeelTexture> {
        self.dummy_texture
    }

    pub fn dummy_sampler(&self) -> Handle<KeelSampler> {
        self.dummy_sampler
    }

    /// Take ownership of a native object
    pub fn create<T: PooledResource>(
        &mut self,
        object: T,
    ) -> Holder<T> {
        self.pools.insert(object)
    }

    /// None means the object is already gone, which callers should tolerate
    pub fn get<T: PooledResource>(
        &self,
        handle: Handle<T>,
    ) -> Option<&T> {
        self.pools.get(handle)
    }

    pub fn num_objects<T: PooledResource>(&self) -> usize {
        self.pools.pool::<T>().num_objects()
    }

    /// Destroy the object once `since` and everything before it has retired. For handles that
    /// came from `Holder::detach`, holders release themselves.
    pub fn release<T: PooledResource>(
        &mut self,
        handle: Handle<T>,
        since: KeelSubmissionId,
    ) {
        if handle.is_empty() {
            return;
        }

        log::trace!(
            "Releasing {} {:?} after {:?}",
            core::any::type_name::<T>(),
            handle,
            since
        );

        self.deferred_tasks
            .push(since, move |pools: &mut ResourcePoolSet| pools.destroy(handle));
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Open a recording session. Publishes the bindless table first if anything changed, so the
    /// table bound for this session is current. This may block if every table copy is in use.
    #[profiling::function]
    pub fn begin_recording(&mut self) -> KeelResult<()> {
        assert!(!self.recording, "a recording session is already open");
        self.process_released();
        self.publish_if_dirty()?;
        self.recording = true;
        Ok(())
    }

    /// Submit the work recorded since `begin_recording`, then run every deferred destroy that has
    /// become safe.
    #[profiling::function]
    pub fn submit(&mut self) -> KeelResult<KeelSubmissionId> {
        assert!(self.recording, "submit called without an open recording session");

        // Releases seen during recording may be referenced by the commands about to be submitted
        self.process_released();
        self.recording = false;

        let submission = self.tracker.submit()?;
        self.pools.bindless_mut().on_submitted(submission);
        self.deferred_tasks
            .drain_ready(&mut self.pools, &*self.tracker);

        Ok(submission)
    }

    pub fn mark_bindless_dirty(&mut self) {
        self.pools.bindless_mut().mark_dirty();
    }

    /// Normally called by `begin_recording`. Not allowed while a recording session is open, the
    /// copy bound for the session has to stay bound until it is submitted.
    pub fn publish_if_dirty(&mut self) -> KeelResult<bool> {
        assert!(
            !self.recording,
            "cannot publish the bindless table while a recording session is open"
        );

        self.pools
            .publish_bindless_if_dirty(&mut *self.tracker)
    }

    pub fn bindless(&self) -> &BindlessTablePublisher {
        self.pools.bindless()
    }

    /// Run deferred destroys whose submission has retired. Never blocks.
    pub fn drain_ready(&mut self) -> usize {
        self.process_released();
        self.deferred_tasks
            .drain_ready(&mut self.pools, &*self.tracker)
    }

    /// Wait for the GPU and run every deferred destroy
    pub fn drain_all_blocking(&mut self) -> KeelResult<usize> {
        assert!(
            !self.recording,
            "cannot wait for work that is still being recorded"
        );

        self.process_released();
        self.deferred_tasks
            .drain_all_blocking(&mut self.pools, &mut *self.tracker)
    }

    pub fn metrics(&self) -> ResourceManagerMetrics {
        ResourceManagerMetrics {
            buffer_count: self.num_objects::<KeelBuffer>(),
            texture_count: self.num_objects::<KeelTexture>(),
            sampler_count: self.num_objects::<KeelSampler>(),
            shader_module_count: self.num_objects::<KeelShaderModule>(),
            pipeline_count: self.num_objects::<KeelPipeline>(),
            pending_deferred_tasks: self.deferred_tasks.len(),
            bindless_table_rebuilds: self.bindless().rebuild_count(),
        }
    }

    /// Wait for the GPU to go idle and destroy everything. Objects still owned by a holder at this
    /// point are reported as leaks and destroyed anyway. Called by `Drop` if not called explicitly.
    pub fn destroy(&mut self) -> KeelResult<()> {
        if self.destroyed {
            return Ok(());
        }

        self.destroyed = true;
        log::info!("Cleaning up resource manager");
        log::trace!("Resource Manager Metrics:\n{:#?}", self.metrics());

        let result = self.shutdown();
        if let Err(e) = &result {
            log::error!(
                "Resource manager shutdown failed, {} deferred destroys did not run: {}",
                self.deferred_tasks.len(),
                e
            );
        }

        log::info!("Dropping resource manager");
        result
    }

    fn shutdown(&mut self) -> KeelResult<()> {
        if self.recording {
            log::warn!("Resource manager destroyed with a recording session open, submitting it");
            self.submit()?;
        }

        self.process_released();
        if let Err(e) = self.tracker.wait_all() {
            self.deferred_tasks
                .drain_ready(&mut self.pools, &*self.tracker);
            return Err(e);
        }

        self.deferred_tasks
            .drain_all_blocking(&mut self.pools, &mut *self.tracker)?;

        self.warn_if_leaked::<KeelBuffer>(0);
        self.warn_if_leaked::<KeelTexture>(1);
        self.warn_if_leaked::<KeelSampler>(1);
        self.warn_if_leaked::<KeelShaderModule>(0);
        self.warn_if_leaked::<KeelPipeline>(0);

        self.pools.destroy_all();
        Ok(())
    }

    fn warn_if_leaked<T: PooledResource>(
        &self,
        dummy_count: usize,
    ) {
        let leaked = self.num_objects::<T>().saturating_sub(dummy_count);
        if leaked > 0 {
            log::warn!(
                "{} resource count {} > 0, resources will leak",
                core::any::type_name::<T>(),
                leaked
            );
        }
    }

    // Turn dropped holders into deferred releases
    fn process_released(&mut self) {
        let since = if self.recording {
            self.tracker.next_submission()
        } else {
            self.tracker.last_submission()
        };

        self.process_released_in_pool::<KeelBuffer>(since);
        self.process_released_in_pool::<KeelTexture>(since);
        self.process_released_in_pool::<KeelSampler>(since);
        self.process_released_in_pool::<KeelShaderModule>(since);
        self.process_released_in_pool::<KeelPipeline>(since);
    }

    fn process_released_in_pool<T: PooledResource>(
        &mut self,
        since: KeelSubmissionId,
    ) {
        let released = self.pools.pool::<T>().take_released();
        for handle in released {
            self.release(handle, since);
        }
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        // Errors were already logged
        let _ = self.destroy();
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("metrics", &self.metrics())
            .field("recording", &self.recording)
            .finish()
    }
}
