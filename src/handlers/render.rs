//! `Render` task handler (§4.4): shell out to the external renderer for one
//! fragment, then reply with the original payload augmented with the
//! outcome.

use std::process::Command;

use serde_json::Value;
use tracing::warn;

use super::temperature::probe_temperature;
use crate::compose::RenderFragmentPayload;

/// Environment variable naming the renderer executable; the renderer
/// itself is an external collaborator per §1, out of scope here.
const RENDERER_ENV: &str = "TASKMESH_RENDERER";
const DEFAULT_RENDERER: &str = "taskmesh-render";

/// Parse the fragment rectangle and render-config path, shell out to the
/// renderer, then reply with the original payload JSON plus `success` and
/// `temperature`.
#[must_use]
pub fn handle_render(payload: &str) -> String {
    let fragment: Result<RenderFragmentPayload, _> = serde_json::from_str(payload);
    let Ok(fragment) = fragment else {
        return augmented_failure(payload);
    };

    let renderer = std::env::var(RENDERER_ENV).unwrap_or_else(|_| DEFAULT_RENDERER.to_string());
    let status = Command::new(&renderer)
        .arg("--ini")
        .arg(&fragment.ini)
        .arg("--x")
        .arg(fragment.frag_x.to_string())
        .arg("--y")
        .arg(fragment.frag_y.to_string())
        .arg("--width")
        .arg(fragment.frag_w.to_string())
        .arg("--height")
        .arg(fragment.frag_h.to_string())
        .arg("--output")
        .arg(&fragment.fragment_output)
        .status();

    let success = match status {
        Ok(status) if status.success() => true,
        Ok(status) => {
            warn!(code = ?status.code(), renderer, "renderer exited with failure");
            false
        }
        Err(error) => {
            warn!(%error, renderer, "failed to launch renderer");
            false
        }
    };

    augment(payload, success)
}

fn augment(payload: &str, success: bool) -> String {
    let mut value: Value = serde_json::from_str(payload).unwrap_or_else(|_| serde_json::json!({}));
    let temperature = probe_temperature()
        .map(|t| t.to_string())
        .unwrap_or_default();
    if let Value::Object(map) = &mut value {
        map.insert(
            "success".to_string(),
            Value::String(if success { "1" } else { "0" }.to_string()),
        );
        map.insert("temperature".to_string(), Value::String(temperature));
    }
    value.to_string()
}

fn augmented_failure(payload: &str) -> String {
    augment(payload, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_renderer_binary_reports_failure() {
        // No other test in this module reads RENDERER_ENV, so setting it
        // process-wide for the duration of this test is safe.
        std::env::set_var(RENDERER_ENV, "/nonexistent/taskmesh-render-binary");
        let payload = serde_json::json!({
            "ini": "job.ini",
            "parent_id": 1,
            "frag_x": 1,
            "frag_y": 1,
            "frag_w": 10,
            "frag_h": 10,
            "image_width": 20,
            "image_height": 20,
            "output_file_name": "out.tga",
            "fragment_output": "frag0.tga",
        })
        .to_string();
        let result = handle_render(&payload);
        let v: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(v["success"], "0");
        std::env::remove_var(RENDERER_ENV);
    }

    #[test]
    fn malformed_payload_reports_failure() {
        let result = handle_render("not json");
        let v: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(v["success"], "0");
    }
}
