//! Chassis temperature probe (§9 "Temperature probe").
//!
//! Out of scope per §1's external-collaborator list; this is a thin,
//! never-hard-error shim over whatever the platform exposes. Linux exposes
//! thermal zones under `/sys/class/thermal`; anywhere else (or if no zone
//! is readable) the probe simply reports nothing.

/// Read the first available thermal zone's temperature in degrees Celsius.
/// Returns `None` rather than an error when no sensor is available.
#[must_use]
pub fn probe_temperature() -> Option<f64> {
    for entry in std::fs::read_dir("/sys/class/thermal").ok()?.flatten() {
        let path = entry.path().join("temp");
        if let Ok(raw) = std::fs::read_to_string(&path) {
            if let Ok(millidegrees) = raw.trim().parse::<f64>() {
                return Some(millidegrees / 1000.0);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_panics_regardless_of_platform() {
        // Either Some(reasonable value) or None; both are valid outcomes,
        // the only requirement is that this never panics or errors.
        let _ = probe_temperature();
    }
}
