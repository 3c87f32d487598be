use super::queue::KeelSimQueue;
use super::SimState;
use crate::{
    KeelBindlessTableWrite, KeelBuffer, KeelBufferDef, KeelDevice, KeelNativeObject,
    KeelPipeline, KeelPipelineType, KeelRawHandle, KeelResult, KeelSampler, KeelShaderModule,
    KeelTexture, KeelTextureDef,
};
use std::sync::{Arc, Mutex};

/// Snapshot of one bindless table upload
#[derive(Clone, Debug)]
pub struct KeelSimBindlessUpload {
    pub copy_index: u32,
    /// Counter of the most recent submission at the time of the upload
    pub after_submission: u64,
    pub sampled_textures: Vec<KeelRawHandle>,
    pub storage_textures: Vec<KeelRawHandle>,
    pub samplers: Vec<KeelRawHandle>,
}

/// Simulated device. Cloning it produces another reference to the same device.
#[derive(Clone)]
pub struct KeelSimDevice {
    state: Arc<Mutex<SimState>>,
}

impl Default for KeelSimDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl KeelSimDevice {
    pub fn new() -> Self {
        let state = SimState {
            next_raw: 1,
            submit_counter: 1,
            ..Default::default()
        };

        KeelSimDevice {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Create the (single) queue of this device with `ring_size` command buffer slots
    pub fn create_queue(
        &self,
        ring_size: u32,
    ) -> KeelSimQueue {
        assert!(ring_size > 0);
        let mut state = self.state.lock().unwrap();
        assert!(state.ring.is_empty(), "KeelSimDevice only supports one queue");
        state.ring = vec![0; ring_size as usize];

        KeelSimQueue {
            state: self.state.clone(),
        }
    }

    fn allocate_raw(&self) -> KeelRawHandle {
        let mut state = self.state.lock().unwrap();
        let raw = KeelRawHandle(state.next_raw);
        state.next_raw += 1;
        state.live_objects.insert(raw);
        raw
    }

    pub fn create_buffer(
        &self,
        buffer_def: &KeelBufferDef,
    ) -> KeelResult<KeelBuffer> {
        Ok(KeelBuffer {
            raw: self.allocate_raw(),
            buffer_def: buffer_def.clone(),
        })
    }

    pub fn create_texture(
        &self,
        texture_def: &KeelTextureDef,
    ) -> KeelResult<KeelTexture> {
        Ok(KeelTexture {
            raw: self.allocate_raw(),
            texture_def: texture_def.clone(),
        })
    }

    pub fn create_sampler(&self) -> KeelResult<KeelSampler> {
        Ok(KeelSampler {
            raw: self.allocate_raw(),
        })
    }

    pub fn create_shader_module(&self) -> KeelResult<KeelShaderModule> {
        Ok(KeelShaderModule {
            raw: self.allocate_raw(),
        })
    }

    pub fn create_pipeline(
        &self,
        pipeline_type: KeelPipelineType,
    ) -> KeelResult<KeelPipeline> {
        Ok(KeelPipeline {
            raw: self.allocate_raw(),
            pipeline_type,
        })
    }

    pub fn is_live(
        &self,
        raw: KeelRawHandle,
    ) -> bool {
        self.state.lock().unwrap().live_objects.contains(&raw)
    }

    pub fn live_object_count(&self) -> usize {
        self.state.lock().unwrap().live_objects.len()
    }

    pub fn destroyed_objects(&self) -> Vec<KeelNativeObject> {
        self.state.lock().unwrap().destroyed_objects.clone()
    }

    /// Destroys of null, unknown, or already-destroyed objects
    pub fn invalid_destroy_count(&self) -> u32 {
        self.state.lock().unwrap().invalid_destroy_count
    }

    pub fn bindless_uploads(&self) -> Vec<KeelSimBindlessUpload> {
        self.state.lock().unwrap().bindless_uploads.clone()
    }

    /// Number of times a bindless table copy was overwritten while an unretired submission
    /// could still read it
    pub fn bindless_hazard_count(&self) -> u32 {
        self.state.lock().unwrap().bindless_hazard_count
    }

    /// Make the next `update_bindless_table` call fail without touching the table
    pub fn fail_next_bindless_upload(&self) {
        self.state.lock().unwrap().fail_next_bindless_upload = true;
    }
}

impl KeelDevice for KeelSimDevice {
    fn destroy_native(
        &self,
        object: KeelNativeObject,
    ) {
        let mut state = self.state.lock().unwrap();
        if !state.live_objects.remove(&object.raw()) {
            log::error!("Destroyed an object that is not alive: {:?}", object);
            state.invalid_destroy_count += 1;
        }

        state.destroyed_objects.push(object);
    }

    fn update_bindless_table(
        &self,
        copy_index: u32,
        write: &KeelBindlessTableWrite,
    ) -> KeelResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_bindless_upload {
            state.fail_next_bindless_upload = false;
            return Err("simulated bindless table upload failure".into());
        }

        let completed_counter = state.completed_counter;
        let in_use = state
            .in_flight_reads
            .iter()
            .any(|x| x.copy_index == copy_index && x.counter > completed_counter);

        if in_use {
            log::error!(
                "Bindless table copy {} overwritten while the GPU may still read it",
                copy_index
            );
            state.bindless_hazard_count += 1;
        }

        let upload = KeelSimBindlessUpload {
            copy_index,
            after_submission: state.last_submission.counter,
            sampled_textures: write.sampled_textures.to_vec(),
            storage_textures: write.storage_textures.to_vec(),
            samplers: write.samplers.to_vec(),
        };
        state.bindless_uploads.push(upload);
        state.bound_copy = Some(copy_index);
        Ok(())
    }
}
