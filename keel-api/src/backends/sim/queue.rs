use super::{SimInFlightRead, SimState};
use crate::{KeelError, KeelResult, KeelSubmissionId, KeelSubmissionTracker};
use std::sync::{Arc, Mutex};

/// Simulated GPU queue with a ring of `ring_size` command buffer slots. Submitting into a slot
/// whose previous work hasn't retired blocks until it does, like a real backend waiting on the
/// slot's fence.
#[derive(Clone)]
pub struct KeelSimQueue {
    pub(super) state: Arc<Mutex<SimState>>,
}

impl KeelSimQueue {
    pub fn ring_size(&self) -> u32 {
        self.state.lock().unwrap().ring.len() as u32
    }

    /// Simulate the GPU finishing everything up to and including `submission`
    pub fn retire_through(
        &self,
        submission: KeelSubmissionId,
    ) {
        self.state
            .lock()
            .unwrap()
            .complete_through(submission.counter);
    }

    /// Simulate the GPU going idle
    pub fn retire_all(&self) {
        let mut state = self.state.lock().unwrap();
        let last = state.last_submission.counter;
        state.complete_through(last);
    }

    /// From now on nothing retires and every wait fails
    pub fn set_device_lost(&self) {
        log::warn!("Simulated device lost");
        self.state.lock().unwrap().device_lost = true;
    }

    /// Number of times the CPU blocked on the simulated GPU
    pub fn wait_count(&self) -> u32 {
        self.state.lock().unwrap().wait_count
    }

    pub fn completed_counter(&self) -> u64 {
        self.state.lock().unwrap().completed_counter
    }

    fn wait_locked(
        state: &mut SimState,
        submission: KeelSubmissionId,
    ) -> KeelResult<()> {
        if state.is_retired(submission) {
            return Ok(());
        }

        if state.device_lost {
            return Err(KeelError::DeviceLost);
        }

        if submission.counter > state.last_submission.counter {
            return Err(format!(
                "Waiting for submission {:?} which has not been submitted",
                submission
            )
            .into());
        }

        state.wait_count += 1;
        state.complete_through(submission.counter);
        Ok(())
    }
}

impl KeelSubmissionTracker for KeelSimQueue {
    #[profiling::function]
    fn submit(&mut self) -> KeelResult<KeelSubmissionId> {
        let mut state = self.state.lock().unwrap();
        if state.device_lost {
            return Err(KeelError::DeviceLost);
        }

        // The slot we're about to reuse might still be executing
        let queue_slot = state.next_queue_slot;
        let previous = KeelSubmissionId::new(queue_slot, state.ring[queue_slot as usize]);
        if !state.is_retired(previous) {
            log::trace!("Waiting for command buffer slot {}", queue_slot);
            Self::wait_locked(&mut state, previous)?;
        }

        let submission = KeelSubmissionId::new(queue_slot, state.submit_counter);
        state.ring[queue_slot as usize] = submission.counter;
        state.last_submission = submission;
        if let Some(copy_index) = state.bound_copy {
            state.in_flight_reads.push_back(SimInFlightRead {
                counter: submission.counter,
                copy_index,
            });
        }

        state.submit_counter = state.submit_counter.wrapping_add(1);
        if state.submit_counter == 0 {
            // 0 is the empty id
            state.submit_counter = 1;
        }
        state.next_queue_slot = (queue_slot + 1) % state.ring.len() as u32;

        Ok(submission)
    }

    fn last_submission(&self) -> KeelSubmissionId {
        self.state.lock().unwrap().last_submission
    }

    fn next_submission(&self) -> KeelSubmissionId {
        let state = self.state.lock().unwrap();
        KeelSubmissionId::new(state.next_queue_slot, state.submit_counter)
    }

    fn is_retired(
        &self,
        submission: KeelSubmissionId,
    ) -> bool {
        self.state.lock().unwrap().is_retired(submission)
    }

    fn wait(
        &mut self,
        submission: KeelSubmissionId,
    ) -> KeelResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::wait_locked(&mut state, submission)
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::KeelSimDevice;
    use crate::{KeelError, KeelSubmissionId, KeelSubmissionTracker};

    #[test]
    fn test_ids_increase_and_rotate_slots() {
        let device = KeelSimDevice::new();
        let mut queue = device.create_queue(3);

        assert!(queue.last_submission().is_empty());
        assert_eq!(KeelSubmissionId::new(0, 1), queue.next_submission());

        let s1 = queue.submit().unwrap();
        let s2 = queue.submit().unwrap();
        let s3 = queue.submit().unwrap();
        assert_eq!(KeelSubmissionId::new(0, 1), s1);
        assert_eq!(KeelSubmissionId::new(1, 2), s2);
        assert_eq!(KeelSubmissionId::new(2, 3), s3);
        assert!(s1 < s2 && s2 < s3);
        assert_eq!(s3, queue.last_submission());
    }

    #[test]
    fn test_retirement_is_in_order() {
        let device = KeelSimDevice::new();
        let mut queue = device.create_queue(4);
        let s1 = queue.submit().unwrap();
        let s2 = queue.submit().unwrap();

        assert!(queue.is_retired(KeelSubmissionId::default()));
        assert!(!queue.is_retired(s1));

        queue.retire_through(s1);
        assert!(queue.is_retired(s1));
        assert!(!queue.is_retired(s2));

        queue.retire_all();
        assert!(queue.is_retired(s2));
        assert_eq!(0, queue.wait_count());
    }

    #[test]
    fn test_full_ring_applies_backpressure() {
        let device = KeelSimDevice::new();
        let mut queue = device.create_queue(2);
        let s1 = queue.submit().unwrap();
        queue.submit().unwrap();

        // Slot 0 is still busy with s1
        let s3 = queue.submit().unwrap();
        assert_eq!(0, s3.queue_slot);
        assert!(queue.is_retired(s1));
        assert_eq!(1, queue.wait_count());
    }

    #[test]
    fn test_wait() {
        let device = KeelSimDevice::new();
        let mut queue = device.create_queue(3);
        let s1 = queue.submit().unwrap();
        let s2 = queue.submit().unwrap();

        queue.wait(s1).unwrap();
        assert!(queue.is_retired(s1));
        assert!(!queue.is_retired(s2));

        queue.wait_all().unwrap();
        assert!(queue.is_retired(s2));
        assert_eq!(2, queue.wait_count());

        // Unsubmitted work can't be waited on
        assert!(queue.wait(queue.next_submission()).is_err());
    }

    #[test]
    fn test_device_lost() {
        let device = KeelSimDevice::new();
        let mut queue = device.create_queue(3);
        let s1 = queue.submit().unwrap();
        queue.set_device_lost();

        queue.retire_all();
        assert!(!queue.is_retired(s1));
        assert!(matches!(queue.wait(s1), Err(KeelError::DeviceLost)));
        assert!(matches!(queue.submit(), Err(KeelError::DeviceLost)));
    }
}
