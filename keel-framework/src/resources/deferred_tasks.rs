use keel_api::{KeelResult, KeelSubmissionId, KeelSubmissionTracker};
use std::collections::VecDeque;

pub type DeferredTaskFn<C> = dyn FnOnce(&mut C) + Send;

struct DeferredTask<C> {
    action: Box<DeferredTaskFn<C>>,
    waits_on: KeelSubmissionId,
}

/// Runs cleanup actions once the GPU submission they depend on has retired.
///
/// Tasks are kept in enqueue order and their submission ids never decrease from front to back.
/// Since submissions retire in order, the first task that is not ready means nothing behind it is
/// ready either.
///
/// `C` is the state the actions operate on. It's passed in when draining rather than captured so
/// that the queue can live next to that state.
pub struct DeferredTaskQueue<C> {
    tasks: VecDeque<DeferredTask<C>>,
}

impl<C> Default for DeferredTaskQueue<C> {
    fn default() -> Self {
        DeferredTaskQueue {
            tasks: Default::default(),
        }
    }
}

impl<C> DeferredTaskQueue<C> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Schedule `action` to run after `waits_on` retires. An id older than the newest queued task
    /// is raised to match it, waiting longer is always safe.
    pub fn push<F: FnOnce(&mut C) + Send + 'static>(
        &mut self,
        waits_on: KeelSubmissionId,
        action: F,
    ) {
        let waits_on = match self.tasks.back() {
            Some(last) if last.waits_on > waits_on => last.waits_on,
            _ => waits_on,
        };

        self.tasks.push_back(DeferredTask {
            action: Box::new(action),
            waits_on,
        });
    }

    /// Run every task at the front of the queue whose submission has retired. Never blocks.
    /// Returns the number of tasks that ran.
    #[profiling::function]
    pub fn drain_ready(
        &mut self,
        context: &mut C,
        tracker: &dyn KeelSubmissionTracker,
    ) -> usize {
        let mut ran = 0;
        while let Some(task) = self.tasks.front() {
            if !tracker.is_retired(task.waits_on) {
                break;
            }

            // front() was Some
            if let Some(task) = self.tasks.pop_front() {
                (task.action)(context);
                ran += 1;
            }
        }

        if ran > 0 {
            log::debug!(
                "Ran {} deferred tasks, {} still waiting",
                ran,
                self.tasks.len()
            );
        }

        ran
    }

    /// Block until every queued task's submission retires, running the tasks in order. Only meant
    /// for shutdown.
    ///
    /// If a wait fails (i.e. device lost) the error is returned. Tasks that already retired have
    /// run by then, the rest stay queued.
    pub fn drain_all_blocking(
        &mut self,
        context: &mut C,
        tracker: &mut dyn KeelSubmissionTracker,
    ) -> KeelResult<usize> {
        let mut ran = self.drain_ready(context, tracker);

        // The back of the queue has the newest id, waiting on it covers everything
        if let Some(last) = self.tasks.back() {
            let waits_on = last.waits_on;
            if let Err(e) = tracker.wait(waits_on) {
                log::error!(
                    "Failed waiting for submission {:?} with {} deferred tasks remaining: {}",
                    waits_on,
                    self.tasks.len(),
                    e
                );
                return Err(e);
            }

            ran += self.drain_ready(context, tracker);
        }

        debug_assert!(self.tasks.is_empty());
        Ok(ran)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
