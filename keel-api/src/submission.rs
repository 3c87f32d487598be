use crate::KeelResult;

/// Identifies one batch of GPU work.
///
/// `queue_slot` is the command buffer slot in the backend's submission ring the work went to, and
/// `counter` increases by one with every submission. A counter of 0 is never assigned, so
/// `KeelSubmissionId::default()` is the empty id, which is always considered retired.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeelSubmissionId {
    pub counter: u64,
    pub queue_slot: u32,
}

impl KeelSubmissionId {
    pub fn new(
        queue_slot: u32,
        counter: u64,
    ) -> Self {
        KeelSubmissionId {
            counter,
            queue_slot,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }
}

/// The interface of the command submission layer that keel relies on.
///
/// Implementations must guarantee that ids returned by `submit` strictly increase and that a
/// submission retires only after every earlier submission has retired. Everything in keel that
/// defers work keys off of these two properties.
pub trait KeelSubmissionTracker: Send {
    /// Submit the currently recorded work and return its id
    fn submit(&mut self) -> KeelResult<KeelSubmissionId>;

    /// The id of the most recent submission, or the empty id if nothing has been submitted yet
    fn last_submission(&self) -> KeelSubmissionId;

    /// The id the next call to `submit` will return
    fn next_submission(&self) -> KeelSubmissionId;

    /// Non-blocking check for whether the GPU has finished the given submission
    fn is_retired(
        &self,
        submission: KeelSubmissionId,
    ) -> bool;

    /// Block until the given submission retires. Returns an error if the device is lost while
    /// waiting.
    fn wait(
        &mut self,
        submission: KeelSubmissionId,
    ) -> KeelResult<()>;

    /// Block until everything submitted so far retires
    fn wait_all(&mut self) -> KeelResult<()> {
        let last_submission = self.last_submission();
        self.wait(last_submission)
    }
}
