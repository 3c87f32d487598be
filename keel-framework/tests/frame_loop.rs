use keel_api::sim::{KeelSimDevice, KeelSimQueue};
use keel_api::{
    KeelBuffer, KeelBufferDef, KeelRawHandle, KeelResourceType, KeelSubmissionTracker,
    KeelTexture, KeelTextureDef,
};
use keel_framework::{Holder, ResourceManager, ResourceManagerConfig};
use std::collections::VecDeque;
use std::sync::Arc;

fn create_manager(
    device: &KeelSimDevice,
    queue: &KeelSimQueue,
    config: &ResourceManagerConfig,
) -> ResourceManager {
    let dummy_texture = device
        .create_texture(&KeelTextureDef {
            resource_type: KeelResourceType::TEXTURE | KeelResourceType::TEXTURE_READ_WRITE,
            ..Default::default()
        })
        .unwrap();
    let dummy_sampler = device.create_sampler().unwrap();

    ResourceManager::new(
        Arc::new(device.clone()),
        Box::new(queue.clone()),
        dummy_texture,
        dummy_sampler,
        config,
    )
}

struct Release {
    raw: KeelRawHandle,
    since_counter: u64,
}

// Nothing may be destroyed before the work submitted ahead of its release retired. Destroys only
// happen inside submit() and drain_ready(), so checking right after each of them is enough.
fn assert_no_early_destroys(
    device: &KeelSimDevice,
    queue: &KeelSimQueue,
    releases: &[Release],
) {
    let completed_counter = queue.completed_counter();
    for release in releases {
        if !device.is_live(release.raw) {
            assert!(completed_counter >= release.since_counter);
        }
    }
}

#[test]
fn test_streaming_frame_loop() {
    let _ = env_logger::try_init();

    let device = KeelSimDevice::new();
    let queue = device.create_queue(3);
    let config = ResourceManagerConfig {
        initial_bindless_table_capacity: 4,
        ..Default::default()
    };
    let mut manager = create_manager(&device, &queue, &config);

    let mut textures: VecDeque<Holder<KeelTexture>> = Default::default();
    let mut buffers: VecDeque<Holder<KeelBuffer>> = Default::default();
    let mut releases = vec![];
    let mut in_flight = VecDeque::new();

    for frame_index in 0..64_u64 {
        // Churn a few objects every frame
        let texture = device.create_texture(&KeelTextureDef::default()).unwrap();
        textures.push_back(manager.create(texture));
        let buffer = device.create_buffer(&KeelBufferDef::default()).unwrap();
        buffers.push_back(manager.create(buffer));

        let since_counter = queue.last_submission().counter;
        if textures.len() > 6 {
            let holder = textures.pop_front().unwrap();
            let raw = manager.get(holder.handle()).unwrap().raw;
            releases.push(Release { raw, since_counter });
        }
        if frame_index % 3 == 0 && buffers.len() > 2 {
            let holder = buffers.pop_front().unwrap();
            let raw = manager.get(holder.handle()).unwrap().raw;
            releases.push(Release { raw, since_counter });
        }

        manager.begin_recording().unwrap();

        // Everything the frame samples must be in the table it binds
        {
            let table = manager.bindless().active_table().unwrap();
            for holder in &textures {
                let texture = manager.get(holder.handle()).unwrap();
                assert_eq!(
                    texture.raw,
                    table.sampled_textures[holder.handle().index() as usize]
                );
            }
        }

        // submit() drains too, check it before the GPU moves on
        in_flight.push_back(manager.submit().unwrap());
        assert_no_early_destroys(&device, &queue, &releases);

        // GPU runs one or two frames behind
        let latency = 1 + (frame_index % 2) as usize;
        while in_flight.len() > latency {
            queue.retire_through(in_flight.pop_front().unwrap());
        }
        manager.drain_ready();
        assert_no_early_destroys(&device, &queue, &releases);
    }

    // Slots get reused rather than growing without bound
    assert!(manager.pools().pool::<KeelTexture>().pool().len() <= 16);
    assert!(manager.bindless().capacity() <= 16);

    textures.clear();
    buffers.clear();
    manager.destroy().unwrap();

    assert_eq!(0, device.live_object_count());
    assert_eq!(0, device.invalid_destroy_count());
    assert_eq!(0, device.bindless_hazard_count());
}

#[test]
fn test_gpu_stall_applies_backpressure_without_hazards() {
    let _ = env_logger::try_init();

    let device = KeelSimDevice::new();
    let queue = device.create_queue(8);
    let mut manager = create_manager(&device, &queue, &Default::default());

    // The GPU never retires anything on its own. Every frame dirties the table, so the publisher
    // is the only thing that makes the CPU wait.
    let mut textures = vec![];
    for _ in 0..6 {
        let texture = device.create_texture(&KeelTextureDef::default()).unwrap();
        textures.push(manager.create(texture));
        manager.begin_recording().unwrap();
        manager.submit().unwrap();
    }

    // Rebuilds 4, 5 and 6 reuse copies 0, 1 and 2 and each waits for one frame
    assert_eq!(3, queue.wait_count());
    assert_eq!(0, device.bindless_hazard_count());
    assert_eq!(6, manager.metrics().bindless_table_rebuilds);
}

#[test]
fn test_leaked_holders_are_destroyed_at_shutdown() {
    let _ = env_logger::try_init();

    let device = KeelSimDevice::new();
    let queue = device.create_queue(3);
    let mut manager = create_manager(&device, &queue, &Default::default());

    let buffer = device.create_buffer(&KeelBufferDef::default()).unwrap();
    let leaked = manager.create(buffer);
    manager.begin_recording().unwrap();
    manager.submit().unwrap();

    manager.destroy().unwrap();
    assert_eq!(0, device.live_object_count());

    // The pool is gone, dropping the holder now is harmless
    std::mem::drop(leaked);
    assert_eq!(0, device.invalid_destroy_count());
}
