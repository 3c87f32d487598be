//! A software backend. Native objects are just numbers and the "GPU" makes progress only when told
//! to (`KeelSimQueue::retire_through`, `KeelSimQueue::retire_all`) or when the CPU blocks on it.
//!
//! It validates the things a real driver's validation layer would complain about in this
//! subsystem: destroying an object twice or destroying an unknown object, and overwriting a
//! bindless table copy that an in-flight submission still reads.

mod device;
pub use device::KeelSimBindlessUpload;
pub use device::KeelSimDevice;

mod queue;
pub use queue::KeelSimQueue;

use crate::{KeelNativeObject, KeelRawHandle, KeelSubmissionId};
use fnv::FnvHashSet;
use std::collections::VecDeque;

struct SimInFlightRead {
    counter: u64,
    copy_index: u32,
}

#[derive(Default)]
struct SimState {
    // Objects
    next_raw: u64,
    live_objects: FnvHashSet<KeelRawHandle>,
    destroyed_objects: Vec<KeelNativeObject>,
    invalid_destroy_count: u32,

    // Submissions. ring[i] is the counter of the most recent submission in queue slot i
    ring: Vec<u64>,
    next_queue_slot: u32,
    submit_counter: u64,
    last_submission: KeelSubmissionId,
    completed_counter: u64,
    device_lost: bool,
    wait_count: u32,

    // Bindless
    bound_copy: Option<u32>,
    in_flight_reads: VecDeque<SimInFlightRead>,
    bindless_uploads: Vec<KeelSimBindlessUpload>,
    bindless_hazard_count: u32,
    fail_next_bindless_upload: bool,
}

impl SimState {
    fn is_retired(
        &self,
        submission: KeelSubmissionId,
    ) -> bool {
        submission.is_empty() || submission.counter <= self.completed_counter
    }

    // Let the simulated GPU run forward until the given counter completes
    fn complete_through(
        &mut self,
        counter: u64,
    ) {
        if self.device_lost {
            return;
        }

        let counter = counter.min(self.last_submission.counter);
        if counter > self.completed_counter {
            self.completed_counter = counter;
        }

        let completed_counter = self.completed_counter;
        while self
            .in_flight_reads
            .front()
            .map(|x| x.counter <= completed_counter)
            .unwrap_or(false)
        {
            self.in_flight_reads.pop_front();
        }
    }
}
