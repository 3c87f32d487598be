use keel_api::{
    KeelBindlessTableWrite, KeelDevice, KeelRawHandle, KeelResult, KeelSampler,
    KeelSubmissionId, KeelSubmissionTracker, KeelTexture,
};
use keel_base::slab::Pool;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindlessTableCopyState {
    /// Not readable by any unretired submission
    Free,
    /// Being rewritten
    Building,
    /// May be read by this submission or anything before it
    Submitted(KeelSubmissionId),
}

struct BindlessTableCopy {
    state: BindlessTableCopyState,
    sampled_textures: Vec<KeelRawHandle>,
    storage_textures: Vec<KeelRawHandle>,
    samplers: Vec<KeelRawHandle>,
}

impl BindlessTableCopy {
    fn new() -> Self {
        BindlessTableCopy {
            state: BindlessTableCopyState::Free,
            sampled_textures: Default::default(),
            storage_textures: Default::default(),
            samplers: Default::default(),
        }
    }

    fn as_write(&self) -> KeelBindlessTableWrite<'_> {
        KeelBindlessTableWrite {
            sampled_textures: &self.sampled_textures,
            storage_textures: &self.storage_textures,
            samplers: &self.samplers,
        }
    }
}

/// Keeps the GPU-visible bindless table in sync with the texture and sampler pools.
///
/// There are several copies of the table. A rebuild writes the next copy in rotation and makes it
/// the bound one, so copies still referenced by in-flight submissions are left alone. The table is
/// indexed by pool slot index. Slot 0 of each pool holds a dummy object which stands in for free
/// slots, incompatible textures (multisampled, or lacking the usage flag), and entries past the end
/// of the pool.
pub struct BindlessTablePublisher {
    copies: Vec<BindlessTableCopy>,
    active_copy: Option<u32>,
    next_copy: u32,
    capacity: u32,
    dirty: bool,
    rebuild_count: u64,
}

impl BindlessTablePublisher {
    pub fn new(
        copy_count: u32,
        initial_capacity: u32,
    ) -> Self {
        assert!(copy_count > 0);
        BindlessTablePublisher {
            copies: (0..copy_count).map(|_| BindlessTableCopy::new()).collect(),
            active_copy: None,
            next_copy: 0,
            capacity: initial_capacity.max(1),
            // Nothing has been uploaded yet
            dirty: true,
            rebuild_count: 0,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn copy_count(&self) -> u32 {
        self.copies.len() as u32
    }

    /// Number of entries per binding in each copy
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    pub fn active_copy_index(&self) -> Option<u32> {
        self.active_copy
    }

    /// Contents of the copy that commands being recorded now will read
    pub fn active_table(&self) -> Option<KeelBindlessTableWrite<'_>> {
        self.active_copy
            .map(|index| self.copies[index as usize].as_write())
    }

    pub fn copy_state(
        &self,
        copy_index: u32,
    ) -> BindlessTableCopyState {
        self.copies[copy_index as usize].state
    }

    /// Rebuild and upload the next table copy if anything changed since the last rebuild. Call
    /// before recording commands for the next submission. Returns true if a rebuild happened.
    ///
    /// Blocks if the copy to be rewritten may still be read by the GPU. A failed wait or upload
    /// leaves the table dirty.
    #[profiling::function]
    pub fn publish_if_dirty(
        &mut self,
        textures: &Pool<KeelTexture>,
        samplers: &Pool<KeelSampler>,
        device: &dyn KeelDevice,
        tracker: &mut dyn KeelSubmissionTracker,
    ) -> KeelResult<bool> {
        if !self.dirty {
            return Ok(false);
        }

        for copy in &mut self.copies {
            if let BindlessTableCopyState::Submitted(submission) = copy.state {
                if tracker.is_retired(submission) {
                    copy.state = BindlessTableCopyState::Free;
                }
            }
        }

        let copy_index = self.next_copy;
        if let BindlessTableCopyState::Submitted(submission) = self.copy_state(copy_index) {
            // A copy published but never submitted isn't read by anything
            if submission <= tracker.last_submission() {
                log::debug!(
                    "Bindless table copy {} is still in use by {:?}, waiting",
                    copy_index,
                    submission
                );
                tracker.wait(submission)?;
            }
        }

        let required = textures.len().max(samplers.len()) as u32;
        while self.capacity < required {
            self.capacity *= 2;
            log::debug!("Bindless table capacity grown to {}", self.capacity);
        }

        let capacity = self.capacity;
        let copy = &mut self.copies[copy_index as usize];
        copy.state = BindlessTableCopyState::Building;
        Self::rebuild(copy, capacity, textures, samplers);

        if let Err(e) = device.update_bindless_table(copy_index, &copy.as_write()) {
            copy.state = BindlessTableCopyState::Free;
            return Err(e);
        }

        copy.state = BindlessTableCopyState::Submitted(tracker.next_submission());
        self.active_copy = Some(copy_index);
        self.next_copy = (copy_index + 1) % self.copies.len() as u32;
        self.dirty = false;
        self.rebuild_count += 1;

        log::debug!(
            "Published bindless table copy {} with {} textures and {} samplers",
            copy_index,
            textures.num_objects(),
            samplers.num_objects()
        );

        Ok(true)
    }

    /// Record that `submission` may read the bound copy
    pub fn on_submitted(
        &mut self,
        submission: KeelSubmissionId,
    ) {
        if let Some(active_copy) = self.active_copy {
            self.copies[active_copy as usize].state =
                BindlessTableCopyState::Submitted(submission);
        }
    }

    fn rebuild(
        copy: &mut BindlessTableCopy,
        capacity: u32,
        textures: &Pool<KeelTexture>,
        samplers: &Pool<KeelSampler>,
    ) {
        let dummy_texture = textures
            .slots()
            .next()
            .flatten()
            .map(|x| x.raw)
            .unwrap_or(KeelRawHandle::NULL);
        let dummy_sampler = samplers
            .slots()
            .next()
            .flatten()
            .map(|x| x.raw)
            .unwrap_or(KeelRawHandle::NULL);

        copy.sampled_textures.clear();
        copy.storage_textures.clear();
        copy.samplers.clear();

        for texture in textures.slots() {
            let sampled = texture
                .filter(|x| x.is_sampled_image())
                .map(|x| x.raw)
                .unwrap_or(dummy_texture);
            let storage = texture
                .filter(|x| x.is_storage_image())
                .map(|x| x.raw)
                .unwrap_or(dummy_texture);
            copy.sampled_textures.push(sampled);
            copy.storage_textures.push(storage);
        }

        for sampler in samplers.slots() {
            copy.samplers
                .push(sampler.map(|x| x.raw).unwrap_or(dummy_sampler));
        }

        copy.sampled_textures
            .resize(capacity as usize, dummy_texture);
        copy.storage_textures
            .resize(capacity as usize, dummy_texture);
        copy.samplers.resize(capacity as usize, dummy_sampler);
    }
}

impl std::fmt::Debug for BindlessTablePublisher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("BindlessTablePublisher")
            .field("active_copy", &self.active_copy)
            .field("capacity", &self.capacity)
            .field("dirty", &self.dirty)
            .finish()
    }
}
