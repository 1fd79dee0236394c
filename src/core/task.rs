//! Task envelope, task kinds, and the simple (non-render) task builders.
//!
//! Render fragment construction lives in [`crate::compose`] alongside the
//! compositor that consumes its output — both need the same render-config
//! and rectangle math.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The closed set of task kinds a worker can be asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Reserved/no-op kind; never dispatched by the builders below.
    Null,
    /// Health-check task: sleep `v` seconds, echo `-v`.
    Dummy,
    /// Fixed CPU kernel repeated `nb` times, used for capacity measurement.
    Benchmark,
    /// One fragment of a split render job.
    Render,
}

impl TaskKind {
    /// Maps the `SquidletTaskType` integer used by the tasks-config file.
    #[must_use]
    pub const fn from_config_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Dummy),
            2 => Some(Self::Benchmark),
            3 => Some(Self::Render),
            _ => None,
        }
    }

    /// The numeric code this kind is sent as in the wire header (§4.1 step 2).
    #[must_use]
    pub const fn wire_code(self) -> u32 {
        match self {
            Self::Null => 0,
            Self::Dummy => 1,
            Self::Benchmark => 2,
            Self::Render => 3,
        }
    }

    /// Inverse of [`Self::wire_code`].
    #[must_use]
    pub const fn from_wire_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Null),
            1 => Some(Self::Dummy),
            2 => Some(Self::Benchmark),
            3 => Some(Self::Render),
            _ => None,
        }
    }
}

/// An immutable request envelope dispatched to exactly one worker at a time.
///
/// `result` is `None` until a worker's reply has been received and attached
/// by [`crate::core::Dispatcher::step`]; callers take ownership of completed
/// tasks out of the step's return value.
#[derive(Debug, Clone)]
pub struct Task {
    /// The kind of work this task asks a worker to perform.
    pub kind: TaskKind,
    /// Caller-assigned identifier; opaque to the dispatch engine beyond
    /// being used, together with `sub_id`, as an observability label.
    pub id: u64,
    /// Sub-unit label, e.g. one render fragment out of many belonging to
    /// the same parent `id`. Zero when the task is not part of a group.
    pub sub_id: u64,
    /// Kind-specific JSON arguments, opaque to the engine.
    pub payload: String,
    /// Wall-clock deadline, measured from the moment a worker accepts the
    /// task (not from when it was enqueued).
    pub max_wait: Duration,
    /// The worker's JSON result, once a completed reply has been received.
    pub result: Option<String>,
}

impl Task {
    const fn new(kind: TaskKind, id: u64, sub_id: u64, payload: String, max_wait: Duration) -> Self {
        Self {
            kind,
            id,
            sub_id,
            payload,
            max_wait,
            result: None,
        }
    }

    /// Build a `Dummy` task: the worker sleeps `v` seconds then replies.
    #[must_use]
    pub fn dummy(id: u64, max_wait: Duration, v: i64) -> Self {
        let payload = serde_json::json!({ "v": v }).to_string();
        Self::new(TaskKind::Dummy, id, 0, payload, max_wait)
    }

    /// Build one `Render` fragment task. `sub_id` labels the fragment among
    /// its siblings sharing `id` as the parent job id; `payload` is the
    /// fragment-rectangle-plus-final-image JSON built by
    /// [`crate::compose::build_render_tasks`].
    #[must_use]
    pub fn render_fragment(id: u64, sub_id: u64, max_wait: Duration, payload: String) -> Self {
        Self::new(TaskKind::Render, id, sub_id, payload, max_wait)
    }

    /// Build a `Benchmark` task: the worker runs a fixed CPU kernel `nb`
    /// times over a payload string of the requested size.
    #[must_use]
    pub fn benchmark(id: u64, max_wait: Duration, nb: u32, payload_size: usize) -> Self {
        let filler: String = (0..payload_size)
            .map(|i| (b'a' + (i % 26) as u8) as char)
            .collect();
        let payload = serde_json::json!({
            "id": id,
            "nb": nb,
            "v": filler,
        })
        .to_string();
        Self::new(TaskKind::Benchmark, id, 0, payload, max_wait)
    }

    /// Did the worker's result carry `"success":"1"`?
    ///
    /// Per §4.4, any other value (including a missing field, or a task with
    /// no result at all) counts as failure.
    #[must_use]
    pub fn has_succeeded(&self) -> bool {
        self.result
            .as_deref()
            .and_then(|body| serde_json::from_str::<serde_json::Value>(body).ok())
            .and_then(|v| v.get("success").and_then(|s| s.as_str()).map(str::to_string))
            .is_some_and(|s| s == "1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_payload_round_trips() {
        let task = Task::dummy(1, Duration::from_secs(5), 0);
        let v: serde_json::Value = serde_json::from_str(&task.payload).unwrap();
        assert_eq!(v["v"], 0);
    }

    #[test]
    fn benchmark_payload_has_expected_size() {
        let task = Task::benchmark(7, Duration::from_secs(5), 4, 100);
        let v: serde_json::Value = serde_json::from_str(&task.payload).unwrap();
        assert_eq!(v["nb"], 4);
        assert_eq!(v["v"].as_str().unwrap().len(), 100);
    }

    #[test]
    fn success_detection() {
        let mut task = Task::dummy(1, Duration::from_secs(5), 0);
        assert!(!task.has_succeeded());
        task.result = Some(r#"{"success":"1","v":"0"}"#.to_string());
        assert!(task.has_succeeded());
        task.result = Some(r#"{"success":"0"}"#.to_string());
        assert!(!task.has_succeeded());
    }

    #[test]
    fn task_kind_from_config_code() {
        assert_eq!(TaskKind::from_config_code(1), Some(TaskKind::Dummy));
        assert_eq!(TaskKind::from_config_code(2), Some(TaskKind::Benchmark));
        assert_eq!(TaskKind::from_config_code(3), Some(TaskKind::Render));
        assert_eq!(TaskKind::from_config_code(9), None);
    }
}
