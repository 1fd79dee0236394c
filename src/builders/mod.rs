//! Startup builders: turn the on-disk config files (§6) into a ready
//! [`crate::core::Dispatcher`], mapping each failure mode onto the exit
//! code the CLI is required to return.
//!
//! Mirrors the teacher's `builders::pool_builder` shape — parse config,
//! validate, construct the runtime object — generalized from "one resource
//! pool per config entry" to "one dispatcher over one worker pool".

mod dispatcher_builder;
mod legacy_listener;

pub use dispatcher_builder::{load_tasks_file, load_workers_file, BuildError};
pub use legacy_listener::bind_legacy_listener;
