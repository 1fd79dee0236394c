//! Workers-config file (§6 "Workers-config file").

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::core::WorkerInfo;

/// One worker entry as it appears on disk: `_name`/`_ip`/`_port`, ip and
/// port both kept as strings to match the source format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerEntry {
    /// Human-readable worker name.
    #[serde(rename = "_name")]
    pub name: String,
    /// Dotted-quad IPv4 address.
    #[serde(rename = "_ip")]
    pub ip: String,
    /// TCP port, as a decimal string.
    #[serde(rename = "_port")]
    pub port: String,
}

/// Root of the workers-config JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkersConfig {
    /// The configured worker pool.
    #[serde(rename = "_squidlets")]
    pub squidlets: Vec<WorkerEntry>,
}

impl WorkersConfig {
    /// Parse from a JSON string without validating.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))
    }

    /// Check the document is non-empty and every entry parses as a valid
    /// ip:port pair.
    pub fn validate(&self) -> Result<(), String> {
        if self.squidlets.is_empty() {
            return Err("workers config has no _squidlets entries".into());
        }
        for entry in &self.squidlets {
            entry
                .ip
                .parse::<Ipv4Addr>()
                .map_err(|e| format!("worker `{}` has invalid _ip: {e}", entry.name))?;
            entry
                .port
                .parse::<u16>()
                .map_err(|e| format!("worker `{}` has invalid _port: {e}", entry.name))?;
        }
        Ok(())
    }

    /// Parse, validate, and decode into [`WorkerInfo`] values.
    pub fn load(input: &str) -> Result<Vec<WorkerInfo>, String> {
        let cfg = Self::from_json_str(input)?;
        cfg.validate()?;
        Ok(cfg
            .squidlets
            .iter()
            .map(|e| {
                WorkerInfo::new(
                    e.name.clone(),
                    e.ip.parse().expect("validated above"),
                    e.port.parse().expect("validated above"),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_well_formed_document() {
        let json = r#"{"_squidlets":[
            {"_name":"w0","_ip":"127.0.0.1","_port":"9000"},
            {"_name":"w1","_ip":"127.0.0.1","_port":"9001"}
        ]}"#;
        let workers = WorkersConfig::load(json).unwrap();
        assert_eq!(workers.len(), 2);
        assert_eq!(workers[0].port, 9000);
    }

    #[test]
    fn rejects_empty_pool() {
        let json = r#"{"_squidlets":[]}"#;
        assert!(WorkersConfig::load(json).is_err());
    }

    #[test]
    fn rejects_bad_port() {
        let json = r#"{"_squidlets":[{"_name":"w0","_ip":"127.0.0.1","_port":"nope"}]}"#;
        assert!(WorkersConfig::load(json).is_err());
    }
}
