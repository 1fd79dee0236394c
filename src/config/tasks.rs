//! Tasks-config file (§6 "Tasks-config file").

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{error::TaskBuildError, Task};

/// One entry in the tasks-config document. Every field is transmitted as a
/// string on the wire format; kind-specific fields are optional and only
/// required for their own `SquidletTaskType`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    /// `"1"` = Dummy, `"2"` = Benchmark, `"3"` = Render.
    #[serde(rename = "SquidletTaskType")]
    pub squidlet_task_type: String,
    /// Caller-assigned task id, as a decimal string.
    pub id: String,
    /// Per-task deadline in seconds, as a decimal string.
    #[serde(rename = "maxWait")]
    pub max_wait: String,
    /// Benchmark: kernel repetition count.
    #[serde(default)]
    pub nb: Option<String>,
    /// Benchmark: payload size in bytes.
    #[serde(default, rename = "payloadSize")]
    pub payload_size: Option<String>,
    /// Render: path to the render-config file.
    #[serde(default)]
    pub ini: Option<String>,
    /// Render: minimum fragment edge length.
    #[serde(default, rename = "sizeMinFragment")]
    pub size_min_fragment: Option<String>,
    /// Render: maximum fragment edge length.
    #[serde(default, rename = "sizeMaxFragment")]
    pub size_max_fragment: Option<String>,
}

/// Root of the tasks-config JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// The configured batch of tasks to enqueue at startup.
    pub tasks: Vec<TaskEntry>,
}

impl TasksConfig {
    /// Parse from a JSON string without validating.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))
    }

    /// A document must name at least one task and every entry must carry a
    /// recognized `squidlet_task_type` plus its required fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.tasks.is_empty() {
            return Err("tasks config has no tasks".into());
        }
        for (i, entry) in self.tasks.iter().enumerate() {
            match entry.squidlet_task_type.as_str() {
                "1" => {}
                "2" => {
                    if entry.nb.is_none() || entry.payload_size.is_none() {
                        return Err(format!("task[{i}] (benchmark) missing nb/payload_size"));
                    }
                }
                "3" => {
                    if entry.ini.is_none()
                        || entry.size_min_fragment.is_none()
                        || entry.size_max_fragment.is_none()
                    {
                        return Err(format!(
                            "task[{i}] (render) missing ini/size_min_fragment/size_max_fragment"
                        ));
                    }
                }
                other => return Err(format!("task[{i}] has unknown squidlet_task_type `{other}`")),
            }
            entry
                .id
                .parse::<u64>()
                .map_err(|e| format!("task[{i}] has invalid id: {e}"))?;
            entry
                .max_wait
                .parse::<u64>()
                .map_err(|e| format!("task[{i}] has invalid max_wait: {e}"))?;
        }
        Ok(())
    }

    /// Parse, validate, then expand every entry into one or more [`Task`]s
    /// (a render entry expands into many fragment tasks).
    ///
    /// `nb_workers` is the hint used by the render builder's fragment-size
    /// formula (§4.3).
    pub fn load(input: &str, nb_workers: usize) -> Result<Vec<Task>, TaskBuildError> {
        let cfg = Self::from_json_str(input)
            .map_err(|reason| TaskBuildError::InvalidRenderValue {
                path: "<tasks config>".into(),
                key: "<document>".into(),
                reason,
            })?;
        cfg.validate()
            .map_err(|reason| TaskBuildError::InvalidRenderValue {
                path: "<tasks config>".into(),
                key: "<document>".into(),
                reason,
            })?;

        let mut out = Vec::new();
        for entry in &cfg.tasks {
            let id: u64 = entry.id.parse().expect("validated above");
            let max_wait = Duration::from_secs(entry.max_wait.parse().expect("validated above"));
            match entry.squidlet_task_type.as_str() {
                "1" => out.push(Task::dummy(id, max_wait, i64::try_from(id).unwrap_or(i64::MAX))),
                "2" => {
                    let nb: u32 = entry
                        .nb
                        .as_deref()
                        .expect("validated above")
                        .parse()
                        .map_err(|_| TaskBuildError::InvalidRenderValue {
                            path: "<tasks config>".into(),
                            key: "nb".into(),
                            reason: "not an integer".into(),
                        })?;
                    let payload_size: usize = entry
                        .payload_size
                        .as_deref()
                        .expect("validated above")
                        .parse()
                        .map_err(|_| TaskBuildError::InvalidRenderValue {
                            path: "<tasks config>".into(),
                            key: "payload_size".into(),
                            reason: "not an integer".into(),
                        })?;
                    out.push(Task::benchmark(id, max_wait, nb, payload_size));
                }
                "3" => {
                    let ini = entry.ini.as_deref().expect("validated above");
                    let size_min: u32 = entry
                        .size_min_fragment
                        .as_deref()
                        .expect("validated above")
                        .parse()
                        .map_err(|_| TaskBuildError::InvalidRenderValue {
                            path: "<tasks config>".into(),
                            key: "size_min_fragment".into(),
                            reason: "not an integer".into(),
                        })?;
                    let size_max: u32 = entry
                        .size_max_fragment
                        .as_deref()
                        .expect("validated above")
                        .parse()
                        .map_err(|_| TaskBuildError::InvalidRenderValue {
                            path: "<tasks config>".into(),
                            key: "size_max_fragment".into(),
                            reason: "not an integer".into(),
                        })?;
                    let mut fragments = crate::compose::build_render_tasks(
                        ini, size_min, size_max, id, max_wait, nb_workers,
                    )?;
                    out.append(&mut fragments);
                }
                _ => unreachable!("validated above"),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_dummy_and_benchmark_entries() {
        let json = r#"{"tasks":[
            {"SquidletTaskType":"1","id":"3","maxWait":"5"},
            {"SquidletTaskType":"2","id":"1","maxWait":"5","nb":"4","payloadSize":"100"}
        ]}"#;
        let tasks = TasksConfig::load(json, 1).unwrap();
        assert_eq!(tasks.len(), 2);

        let v: serde_json::Value = serde_json::from_str(&tasks[0].payload).unwrap();
        assert_eq!(v["v"], 3, "a Dummy task's sleep value is its own id");
    }

    #[test]
    fn rejects_benchmark_missing_fields() {
        let json = r#"{"tasks":[{"SquidletTaskType":"2","id":"0","maxWait":"5"}]}"#;
        assert!(TasksConfig::load(json, 1).is_err());
    }

    #[test]
    fn rejects_unknown_task_type() {
        let json = r#"{"tasks":[{"SquidletTaskType":"9","id":"0","maxWait":"5"}]}"#;
        assert!(TasksConfig::load(json, 1).is_err());
    }
}
