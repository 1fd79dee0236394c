//! Shared utilities: wall-clock helpers and tracing bootstrap.

pub mod clock;
pub mod telemetry;

pub use clock::now_ms;
