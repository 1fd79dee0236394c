//! Pairing of an in-flight task with the worker executing it.

use std::time::Instant;

use crate::core::task::Task;
use crate::core::worker::WorkerInfo;
use crate::wire::DispatcherLink;

/// A `Task` paired with the `WorkerInfo` it was dispatched to, the instant
/// the executor accepted it, and the still-open connection the result will
/// arrive on.
///
/// Destroyed when the result arrives, the deadline expires, or the worker
/// turns out to be unreachable — never mutated in place.
#[derive(Debug)]
pub struct RunningTask {
    /// The task in flight.
    pub task: Task,
    /// The worker it was sent to.
    pub worker: WorkerInfo,
    /// When the worker accepted the request.
    pub started_at: Instant,
    /// The live connection the size-probe and body read happen on.
    pub link: DispatcherLink,
}

impl RunningTask {
    /// Construct a running-task record starting now.
    #[must_use]
    pub fn new(task: Task, worker: WorkerInfo, link: DispatcherLink) -> Self {
        Self {
            task,
            worker,
            started_at: Instant::now(),
            link,
        }
    }

    /// Has this task exceeded its own `max_wait` as of `now`?
    #[must_use]
    pub fn has_timed_out(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) > self.task.max_wait
    }
}
