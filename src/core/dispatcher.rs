//! The dispatch engine: matching pending tasks to idle workers and driving
//! the wire protocol (§4.2 "Matching & dispatch loop").

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::core::history::HistoryRing;
use crate::core::running::RunningTask;
use crate::core::task::Task;
use crate::core::worker::WorkerInfo;
use crate::wire::{DispatcherLink, RequestHeader};

/// Owns the three ordered collections (§3 "Dispatcher") and drives one
/// `step()` at a time. Single-threaded; no internal locking (§5).
pub struct Dispatcher {
    workers_available: VecDeque<WorkerInfo>,
    pending: VecDeque<Task>,
    running: Vec<RunningTask>,
    history: HistoryRing,
    telemetry_enabled: bool,
    nb_workers_total: usize,
    // Bound at startup and never accepted on (§3, §9 open question (a)):
    // the original keeps a listening fd the dispatcher never reads from.
    // Kept here only so `step()` never has to know it exists.
    _legacy_listener: Option<std::net::TcpListener>,
}

impl Dispatcher {
    /// Build a dispatcher over the given worker pool; every worker starts
    /// out available.
    #[must_use]
    pub fn new(workers: Vec<WorkerInfo>, telemetry_enabled: bool) -> Self {
        Self::with_legacy_listener(workers, telemetry_enabled, None)
    }

    /// Same as [`Self::new`], additionally holding the legacy listening
    /// socket bound by [`crate::builders::bind_legacy_listener`] (§3, §9
    /// open question (a)). The dispatcher never accepts on it.
    #[must_use]
    pub fn with_legacy_listener(
        workers: Vec<WorkerInfo>,
        telemetry_enabled: bool,
        legacy_listener: Option<std::net::TcpListener>,
    ) -> Self {
        let nb_workers_total = workers.len();
        Self {
            workers_available: workers.into(),
            pending: VecDeque::new(),
            running: Vec::new(),
            history: HistoryRing::default(),
            telemetry_enabled,
            nb_workers_total,
            _legacy_listener: legacy_listener,
        }
    }

    /// Append one task to the pending queue.
    pub fn enqueue(&mut self, task: Task) {
        self.pending.push_back(task);
    }

    /// Append many tasks to the pending queue, preserving order.
    pub fn enqueue_many(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.pending.extend(tasks);
    }

    /// Number of tasks currently pending dispatch.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of tasks currently in flight.
    #[must_use]
    pub const fn running_len(&self) -> usize {
        self.running.len()
    }

    /// Number of workers currently idle.
    #[must_use]
    pub fn workers_available_len(&self) -> usize {
        self.workers_available.len()
    }

    /// Total configured worker count (never changes after construction).
    #[must_use]
    pub const fn nb_workers_total(&self) -> usize {
        self.nb_workers_total
    }

    /// Total tasks this dispatcher still owns, pending or in flight —
    /// `0` means the queue has fully drained (§6 "Dispatcher CLI" loop
    /// condition).
    #[must_use]
    pub fn nb_task_to_complete(&self) -> usize {
        self.pending.len() + self.running.len()
    }

    /// The bounded history ring backing the telemetry panel (§4.6).
    #[must_use]
    pub const fn history(&self) -> &HistoryRing {
        &self.history
    }

    /// Whether the telemetry panel is enabled for this dispatcher.
    #[must_use]
    pub const fn telemetry_enabled(&self) -> bool {
        self.telemetry_enabled
    }

    /// Currently in-flight tasks, for the telemetry panel's listing.
    pub fn running_tasks(&self) -> impl Iterator<Item = &Task> {
        self.running.iter().map(|r| &r.task)
    }

    /// Currently pending tasks, for the telemetry panel's listing.
    pub fn pending_tasks(&self) -> impl Iterator<Item = &Task> {
        self.pending.iter()
    }

    /// Re-queue a task the caller has judged a worker-reported failure
    /// (§7(c), §9 open question (c)) — the engine itself never calls this;
    /// it only re-queues on timeout or connection failure.
    pub fn try_again(&mut self, mut task: Task) {
        task.result = None;
        self.history
            .record(format!("task {}/{} re-queued by caller", task.id, task.sub_id));
        self.pending.push_back(task);
    }

    /// One atomic sweep: collect results, dispatch pending tasks, return
    /// the tasks that completed this step (§4.2).
    ///
    /// Post-processing (§4.4, render compositing) and telemetry refresh are
    /// the caller's responsibility — see [`crate::compose::composite_fragment`]
    /// and the `telemetry` module — so this stays a pure scheduling
    /// primitive with no I/O side effects beyond the wire protocol itself.
    pub fn step(&mut self) -> Vec<Task> {
        let completed = self.collect_results();
        self.dispatch_pending();
        completed
    }

    fn collect_results(&mut self) -> Vec<Task> {
        let now = Instant::now();
        let mut completed = Vec::new();
        let mut still_running = Vec::with_capacity(self.running.len());

        for mut running in self.running.drain(..) {
            match running.link.poll_result_size() {
                Ok(Some(size)) => match running.link.read_result_body(size) {
                    Ok(body) => {
                        let body = String::from_utf8_lossy(&body).into_owned();
                        debug!(
                            worker = %running.worker,
                            task_id = running.task.id,
                            sub_id = running.task.sub_id,
                            "result received"
                        );
                        self.history.record(format!(
                            "task {}/{} completed by {}",
                            running.task.id, running.task.sub_id, running.worker.name
                        ));
                        running.task.result = Some(body);
                        self.workers_available.push_back(running.worker);
                        completed.push(running.task);
                    }
                    Err(error) => {
                        warn!(worker = %running.worker, %error, "result body read failed");
                        self.history.record(format!(
                            "task {}/{} lost result body from {}",
                            running.task.id, running.task.sub_id, running.worker.name
                        ));
                        self.workers_available.push_back(running.worker);
                        running.task.result = None;
                        self.pending.push_back(running.task);
                    }
                },
                Ok(None) => {
                    if running.has_timed_out(now) {
                        info!(
                            worker = %running.worker,
                            task_id = running.task.id,
                            sub_id = running.task.sub_id,
                            "task timed out"
                        );
                        self.history.record(format!(
                            "task {}/{} timed out on {}",
                            running.task.id, running.task.sub_id, running.worker.name
                        ));
                        self.workers_available.push_back(running.worker);
                        running.task.result = None;
                        self.pending.push_back(running.task);
                    } else {
                        still_running.push(running);
                    }
                }
                Err(error) => {
                    warn!(worker = %running.worker, %error, "connection to worker lost");
                    self.history.record(format!(
                        "task {}/{} lost connection to {}",
                        running.task.id, running.task.sub_id, running.worker.name
                    ));
                    self.workers_available.push_back(running.worker);
                    running.task.result = None;
                    self.pending.push_back(running.task);
                }
            }
        }

        self.running = still_running;
        completed
    }

    fn dispatch_pending(&mut self) {
        let nb_available = self.workers_available.len();
        for _ in 0..nb_available {
            let Some(worker) = self.workers_available.pop_front() else {
                break;
            };
            let Some(task) = self.pending.pop_front() else {
                self.workers_available.push_front(worker);
                break;
            };

            match Self::try_dispatch(&worker, &task) {
                Ok(link) => {
                    self.history.record(format!(
                        "task {}/{} dispatched to {}",
                        task.id, task.sub_id, worker.name
                    ));
                    self.running.push(RunningTask::new(task, worker, link));
                }
                Err(error) => {
                    debug!(worker = %worker, %error, "dispatch attempt failed");
                    self.history
                        .record(format!("can't connect to {} for task {}", worker, task.id));
                    self.pending.push_front(task);
                    self.workers_available.push_back(worker);
                }
            }
        }
    }

    fn try_dispatch(
        worker: &WorkerInfo,
        task: &Task,
    ) -> Result<DispatcherLink, crate::wire::WireError> {
        let mut link = DispatcherLink::connect(worker)?;
        link.send_header(RequestHeader {
            kind: task.kind.wire_code(),
            id: task.id,
            sub_id: task.sub_id,
            max_wait_secs: task.max_wait.as_secs(),
        })?;
        link.wait_accept()?;
        link.send_payload(task.payload.as_bytes())?;
        Ok(link)
    }
}
