//! # taskmesh
//!
//! A lightweight distributed task-dispatch framework: a single coordinator
//! (the "dispatcher") hands JSON-payload tasks to a pool of TCP-connected
//! worker processes (the "executors"), one at a time, with per-task
//! deadlines and automatic retry on failure or timeout.
//!
//! ## Core problem solved
//!
//! - **Strongly typed, deadline-bound work**: tasks are one of a closed set
//!   of kinds, carry an opaque JSON payload, and must complete within a
//!   per-task wall-clock window or be re-queued.
//! - **One slot per worker**: each executor runs one task at a time over a
//!   single-shot TCP connection; parallelism comes from running more
//!   executor processes, not from concurrency inside one.
//! - **Non-blocking progress**: the dispatcher's `step()` never blocks on a
//!   slow task — only on small, fixed-size protocol metadata — by polling
//!   each in-flight result's size field instead of waiting on it.
//! - **Split-render post-processing**: the one task kind whose result is a
//!   fragment gets recomposed into a larger artifact by the dispatcher
//!   after the worker replies.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use std::net::Ipv4Addr;
//! use std::time::Duration;
//! use taskmesh::core::{Dispatcher, Task, WorkerInfo};
//!
//! let workers = vec![WorkerInfo::new("w0", Ipv4Addr::LOCALHOST, 9000)];
//! let mut dispatcher = Dispatcher::new(workers, false);
//! dispatcher.enqueue(Task::dummy(0, Duration::from_secs(5), 0));
//!
//! loop {
//!     let completed = dispatcher.step();
//!     for task in &completed {
//!         println!("task {} succeeded = {}", task.id, task.has_succeeded());
//!     }
//!     if dispatcher.nb_task_to_complete() == 0 {
//!         break;
//!     }
//!     std::thread::sleep(Duration::from_secs(1));
//! }
//! ```
//!
//! For complete examples, see:
//! - `tests/` — end-to-end scenarios driving a real dispatcher against a
//!   real (in-process) executor over loopback TCP.
//! - `src/bin/dispatcher.rs`, `src/bin/executor.rs` — the two CLI
//!   front-ends built on top of this library.

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Startup builders: construct a [`core::Dispatcher`] from config files,
/// mapping failures onto CLI exit codes.
pub mod builders;
/// Render fragment tiling and compositing (§4.3, §4.4 post-processor).
pub mod compose;
/// Startup configuration: workers, tasks, render-config documents.
pub mod config;
/// Core dispatch engine: workers, tasks, the running-task ledger, and the
/// `Dispatcher` that matches one to the other.
pub mod core;
/// Executor-side task-kind handlers.
pub mod handlers;
/// Operator-facing telemetry panel.
pub mod telemetry;
/// Shared utilities: wall-clock helpers and tracing bootstrap.
pub mod util;
/// Dispatcher/executor wire protocol.
pub mod wire;
