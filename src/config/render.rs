//! Render-config file: plain text, one `Key=Value` per line (§6).

use std::collections::HashMap;

use crate::core::error::TaskBuildError;

/// Parsed render-config document.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Final image width in pixels.
    pub width: u32,
    /// Final image height in pixels.
    pub height: u32,
    /// Path the final composited image is written to.
    pub output_file_name: String,
}

impl RenderConfig {
    /// Read and parse a render-config file from `path`.
    pub fn load(path: &str) -> Result<Self, TaskBuildError> {
        let text = std::fs::read_to_string(path).map_err(|source| TaskBuildError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse `Key=Value` lines, ignoring blank lines and `#`-prefixed
    /// comments.
    pub fn parse(path: &str, text: &str) -> Result<Self, TaskBuildError> {
        let mut fields: HashMap<&str, &str> = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                fields.insert(key.trim(), value.trim());
            }
        }

        let get = |key: &'static str| {
            fields
                .get(key)
                .copied()
                .ok_or_else(|| TaskBuildError::MissingRenderKey {
                    path: path.to_string(),
                    key: key.to_string(),
                })
        };
        let parse_u32 = |key: &'static str, value: &str| {
            value
                .parse::<u32>()
                .map_err(|e| TaskBuildError::InvalidRenderValue {
                    path: path.to_string(),
                    key: key.to_string(),
                    reason: e.to_string(),
                })
        };

        let width = parse_u32("Width", get("Width")?)?;
        let height = parse_u32("Height", get("Height")?)?;
        let output_file_name = get("Output_File_Name")?.to_string();

        Ok(Self {
            width,
            height,
            output_file_name,
        })
    }
}
