//! Startup configuration: workers, tasks, and render-config documents.

pub mod render;
pub mod tasks;
pub mod workers;

pub use render::RenderConfig;
pub use tasks::{TaskEntry, TasksConfig};
pub use workers::{WorkerEntry, WorkersConfig};
