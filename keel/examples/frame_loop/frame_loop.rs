use log::LevelFilter;

use keel::api::sim::KeelSimDevice;
use keel::api::*;
use keel::framework::{Holder, ResourceManager, ResourceManagerConfig};
use std::collections::VecDeque;
use std::sync::Arc;

const FRAME_COUNT: usize = 20;

// How many frames the simulated GPU lags behind the CPU
const GPU_LATENCY: usize = 2;

fn main() {
    env_logger::Builder::from_default_env()
        .default_format_timestamp_nanos(true)
        .filter_level(LevelFilter::Info)
        .init();

    run().unwrap();
}

fn run() -> KeelResult<()> {
    //
    // The sim backend stands in for a real device. Its queue has a ring of 3 command buffers, so
    // submitting a 4th frame before the 1st retires blocks.
    //
    let device = KeelSimDevice::new();
    let queue = device.create_queue(3);

    //
    // Every unused bindless table entry points at the dummy texture/sampler, so it needs to be
    // usable as both a sampled and a storage image
    //
    let dummy_texture = device.create_texture(&KeelTextureDef {
        resource_type: KeelResourceType::TEXTURE | KeelResourceType::TEXTURE_READ_WRITE,
        ..Default::default()
    })?;
    let dummy_sampler = device.create_sampler()?;

    let mut resource_manager = ResourceManager::new(
        Arc::new(device.clone()),
        Box::new(queue.clone()),
        dummy_texture,
        dummy_sampler,
        &ResourceManagerConfig::default(),
    );

    let sampler = resource_manager.create(device.create_sampler()?);

    // Textures streamed in and out over time. Dropping a holder is all it takes to free one.
    let mut streamed_textures: VecDeque<Holder<KeelTexture>> = Default::default();
    let mut in_flight = VecDeque::default();

    for frame_index in 0..FRAME_COUNT {
        profiling::scope!("frame");

        if frame_index % 2 == 0 {
            let texture = device.create_texture(&KeelTextureDef::default())?;
            streamed_textures.push_back(resource_manager.create(texture));
        }

        if streamed_textures.len() > 4 {
            // Still referenced by frames in flight, it will be destroyed once they retire
            streamed_textures.pop_front();
        }

        resource_manager.begin_recording()?;

        // A real renderer would record draws here, passing these indices to shaders
        let texture_indices: Vec<_> = streamed_textures
            .iter()
            .map(|x| x.handle().index())
            .collect();
        log::debug!(
            "Frame {} samples textures {:?} with sampler {}, bindless copy {:?}",
            frame_index,
            texture_indices,
            sampler.handle().index(),
            resource_manager.bindless().active_copy_index()
        );

        let submission = resource_manager.submit()?;
        in_flight.push_back(submission);

        // Let the GPU catch up to within GPU_LATENCY frames
        while in_flight.len() > GPU_LATENCY {
            if let Some(retired) = in_flight.pop_front() {
                queue.retire_through(retired);
            }
        }
    }

    log::info!("Metrics after {} frames: {:#?}", FRAME_COUNT, resource_manager.metrics());

    std::mem::drop(streamed_textures);
    std::mem::drop(sampler);
    resource_manager.destroy()?;

    log::info!(
        "Destroyed {} native objects, {} bindless uploads, {} CPU waits on the GPU",
        device.destroyed_objects().len(),
        device.bindless_uploads().len(),
        queue.wait_count()
    );

    assert_eq!(0, device.live_object_count());
    assert_eq!(0, device.invalid_destroy_count());
    assert_eq!(0, device.bindless_hazard_count());
    Ok(())
}
