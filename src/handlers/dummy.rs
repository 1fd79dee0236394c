//! `Dummy` task handler (§4.4): sleep, then echo the negated input.

use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

use super::temperature::probe_temperature;

/// Parse `{"v": <int>}`, sleep `v` seconds, reply
/// `{"success":"1"|"0","v":"<-v>","temperature":"<probe>"}`.
#[must_use]
pub fn handle_dummy(payload: &str) -> String {
    let parsed: Result<Value, _> = serde_json::from_str(payload);
    let v = match parsed.as_ref().ok().and_then(|p| p.get("v")).and_then(Value::as_i64) {
        Some(v) => v,
        None => {
            return json!({ "success": "0", "v": "0", "temperature": "" }).to_string();
        }
    };

    if v > 0 {
        thread::sleep(Duration::from_secs(v as u64));
    }

    let temperature = probe_temperature()
        .map(|t| t.to_string())
        .unwrap_or_default();

    json!({
        "success": "1",
        "v": (-v).to_string(),
        "temperature": temperature,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_negated_value() {
        let result = handle_dummy(r#"{"v":0}"#);
        let v: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(v["success"], "1");
        assert_eq!(v["v"], "0");
    }

    #[test]
    fn negative_input_is_negated_too() {
        let result = handle_dummy(r#"{"v":-3}"#);
        let v: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(v["v"], "3");
    }

    #[test]
    fn malformed_payload_reports_failure() {
        let result = handle_dummy("not json");
        let v: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(v["success"], "0");
    }
}
