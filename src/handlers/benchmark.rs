//! `Benchmark` task handler (§4.4): a fixed, deterministic CPU workload
//! used to measure per-worker capacity.

use std::time::Instant;

use serde_json::{json, Value};

use super::temperature::probe_temperature;

/// Parse `nb` and `v`, run a repeated sort of `v`'s bytes `nb` times, and
/// reply `{success, temp, v, err}` where `err` carries the elapsed time in
/// milliseconds (the exact kernel is irrelevant to the protocol — only
/// that it is fixed and deterministic for a given payload size).
#[must_use]
pub fn handle_benchmark(payload: &str) -> String {
    let parsed: Result<Value, _> = serde_json::from_str(payload);
    let (nb, v) = match parsed.as_ref().ok().and_then(|p| {
        let nb = p.get("nb")?.as_u64()?;
        let v = p.get("v")?.as_str()?.to_string();
        Some((nb, v))
    }) {
        Some(pair) => pair,
        None => {
            return json!({ "success": "0", "temp": "", "v": "", "err": "0" }).to_string();
        }
    };

    let start = Instant::now();
    let mut bytes: Vec<u8> = v.bytes().collect();
    for _ in 0..nb {
        bytes.sort_unstable();
        bytes.reverse();
    }
    let elapsed_ms = start.elapsed().as_millis();

    let temperature = probe_temperature()
        .map(|t| t.to_string())
        .unwrap_or_default();

    json!({
        "success": "1",
        "temp": temperature,
        "v": v,
        "err": elapsed_ms.to_string(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_success_for_well_formed_payload() {
        let payload = json!({ "id": 1, "nb": 4, "v": "aaaa" }).to_string();
        let result = handle_benchmark(&payload);
        let v: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(v["success"], "1");
        assert_eq!(v["v"], "aaaa");
    }

    #[test]
    fn malformed_payload_reports_failure() {
        let result = handle_benchmark("not json");
        let v: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(v["success"], "0");
    }
}
