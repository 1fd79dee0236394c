//! Executor-side task-kind handlers (§4.4).
//!
//! Each handler takes a task's JSON payload string and returns the JSON
//! result string to send back over the wire. None of these ever return an
//! `Err` for an ordinary application-level failure — the failure is
//! reported in-band as `"success":"0"` (§4.4), matching the spec's claim
//! that worker-reported failure is the caller's business, not the engine's.

mod benchmark;
mod dummy;
mod render;
mod temperature;

pub use benchmark::handle_benchmark;
pub use dummy::handle_dummy;
pub use render::handle_render;
pub use temperature::probe_temperature;
