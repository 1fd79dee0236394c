//! Core dispatch engine: workers, tasks, the running-task ledger, and the
//! `Dispatcher` that matches one to the other (§3, §4.2).

pub mod dispatcher;
pub mod error;
pub mod history;
pub mod running;
pub mod task;
pub mod worker;

pub use dispatcher::Dispatcher;
pub use error::{AppResult, TaskBuildError};
pub use history::{HistoryEntry, HistoryRing};
pub use running::RunningTask;
pub use task::{Task, TaskKind};
pub use worker::WorkerInfo;
